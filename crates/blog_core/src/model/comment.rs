//! Comment domain model.

use crate::model::post::PostId;
use crate::model::user::UserId;
use crate::model::validation::{require, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CommentId = i64;

/// Insert shape for a comment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: UserId,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("comment", "text", &self.text)
    }
}

/// Persisted comment. Owned by its post and deleted with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// Display label in the form `"{author} under {post title}"`.
pub fn comment_label(author_username: &str, post_title: &str) -> String {
    format!("{author_username} under {post_title}")
}
