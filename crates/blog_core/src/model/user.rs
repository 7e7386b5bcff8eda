//! User reference model.
//!
//! Accounts are owned by an external identity provider. The content store
//! keeps just enough (username, staff flag) to resolve references and to
//! check authorship rules.

use crate::model::validation::{max_chars, require, ValidationError};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

const USERNAME_MAX_CHARS: usize = 150;

/// Insert shape for a user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub is_staff: bool,
}

impl NewUser {
    pub fn new(username: impl Into<String>, is_staff: bool) -> Self {
        Self {
            username: username.into(),
            is_staff,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("user", "username", &self.username)?;
        max_chars("user", "username", &self.username, USERNAME_MAX_CHARS)
    }
}

/// Persisted user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Only staff users may author posts.
    pub is_staff: bool,
}
