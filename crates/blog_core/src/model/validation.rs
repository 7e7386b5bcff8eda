//! Field validation errors shared by all blog records.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection reason for a record that cannot be persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or whitespace only.
    Required {
        entity: &'static str,
        field: &'static str,
    },
    /// A bounded text field exceeds its character limit.
    TooLong {
        entity: &'static str,
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Slug contains characters outside `[-a-zA-Z0-9_]`.
    InvalidSlug(String),
    /// Another tag already uses this (normalized) title.
    DuplicateTagTitle(String),
    /// Another user already uses this username.
    DuplicateUsername(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { entity, field } => write!(f, "{entity}.{field} is required"),
            Self::TooLong {
                entity,
                field,
                max,
                actual,
            } => write!(
                f,
                "{entity}.{field} has {actual} characters, at most {max} allowed"
            ),
            Self::InvalidSlug(value) => write!(
                f,
                "slug `{value}` may only contain letters, numbers, underscores or hyphens"
            ),
            Self::DuplicateTagTitle(value) => write!(f, "tag with title `{value}` already exists"),
            Self::DuplicateUsername(value) => {
                write!(f, "user with username `{value}` already exists")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { entity, field });
    }
    Ok(())
}

pub(crate) fn max_chars(
    entity: &'static str,
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            entity,
            field,
            max,
            actual,
        });
    }
    Ok(())
}
