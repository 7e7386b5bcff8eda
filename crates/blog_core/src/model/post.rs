//! Post domain model.
//!
//! # Responsibility
//! - Define the published-article record and its insert shape.
//! - Validate bounded text fields and slug format.
//!
//! # Invariants
//! - `slug` matches `^[-a-zA-Z0-9_]+$`; it is not unique at storage level.
//! - Authorship by staff users is a data-entry rule, checked by
//!   `PostService`, not here.

use crate::model::user::UserId;
use crate::model::validation::{max_chars, require, ValidationError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type PostId = i64;

const TITLE_MAX_CHARS: usize = 200;
const SLUG_MAX_CHARS: usize = 200;
const IMAGE_MAX_CHARS: usize = 100;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

/// Insert shape for a post row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub slug: String,
    /// Path or storage key of the cover image.
    pub image: String,
    pub published_at: DateTime<Utc>,
    pub author_id: UserId,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.text, &self.slug, &self.image)
    }
}

/// Persisted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: String,
    pub published_at: DateTime<Utc>,
    pub author_id: UserId,
}

impl Post {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.text, &self.slug, &self.image)
    }

    /// Canonical detail-page path.
    pub fn absolute_url(&self) -> String {
        format!("/post/{}/", self.slug)
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Returns whether `value` is a well-formed slug.
pub fn is_valid_slug(value: &str) -> bool {
    SLUG_RE.is_match(value)
}

fn validate_fields(title: &str, text: &str, slug: &str, image: &str) -> Result<(), ValidationError> {
    require("post", "title", title)?;
    max_chars("post", "title", title, TITLE_MAX_CHARS)?;
    require("post", "text", text)?;
    require("post", "slug", slug)?;
    max_chars("post", "slug", slug, SLUG_MAX_CHARS)?;
    if !is_valid_slug(slug) {
        return Err(ValidationError::InvalidSlug(slug.to_string()));
    }
    require("post", "image", image)?;
    max_chars("post", "image", image, IMAGE_MAX_CHARS)
}
