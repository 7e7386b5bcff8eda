//! Environment-driven configuration.
//!
//! | Variable         | Meaning                               | Default          |
//! |------------------|---------------------------------------|------------------|
//! | `BLOG_DB_PATH`   | SQLite database file                  | `blog.sqlite3`   |
//! | `BLOG_LOG_LEVEL` | `trace\|debug\|info\|warn\|error`     | build-mode based |
//! | `BLOG_LOG_DIR`   | absolute directory for rolling logs   | logging disabled |

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "BLOG_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "BLOG_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "BLOG_LOG_DIR";

const DEFAULT_DB_PATH: &str = "blog.sqlite3";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { name: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, reason } => write!(f, "invalid {name}: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Runtime settings for opening the content store and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl BlogConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR).map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(value) => normalize_level(&value).map_err(|reason| ConfigError::InvalidValue {
                name: LOG_LEVEL_VAR,
                reason,
            })?,
            None => default_log_level(),
        };

        let log_dir = match read(LOG_DIR_VAR) {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError::InvalidValue {
                        name: LOG_DIR_VAR,
                        reason: format!("must be an absolute path, got `{value}`"),
                    });
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
