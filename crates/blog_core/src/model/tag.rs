//! Tag domain model.
//!
//! # Invariants
//! - Titles are lowercased by [`NewTag::clean`] before validation.
//! - Titles are unique after normalization.

use crate::model::validation::{max_chars, require, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type TagId = i64;

const TITLE_MAX_CHARS: usize = 20;

/// Insert shape for a tag row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub title: String,
}

impl NewTag {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Normalizes the title in place. Runs before validation on every write.
    pub fn clean(&mut self) {
        self.title = normalize_tag_title(&self.title);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("tag", "title", &self.title)?;
        max_chars("tag", "title", &self.title, TITLE_MAX_CHARS)
    }
}

/// Persisted tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub title: String,
}

impl Tag {
    /// Canonical tag-filter page path.
    pub fn absolute_url(&self) -> String {
        format!("/tag/{}/", self.title)
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Lowercases and trims a tag title.
pub fn normalize_tag_title(title: &str) -> String {
    title.trim().to_lowercase()
}
