//! Content store bootstrap: connections and schema migrations.
//!
//! # Responsibility
//! - Open blog databases (file or in-memory) with foreign keys and a busy
//!   timeout configured.
//! - Bring the schema to the latest embedded migration before any
//!   repository sees the connection.
//!
//! # Invariants
//! - The applied schema version lives in `PRAGMA user_version`.
//! - Foreign keys are enforced, so post deletion cascades to comments and
//!   association rows.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_existing_db};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The database file could not be opened.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// One embedded migration failed; the whole batch was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer schema than this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Open { path, source } => {
                write!(f, "cannot open blog database `{}`: {source}", path.display())
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration {version:04}_{name} failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "blog schema version {db_version} is newer than this build ({latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
