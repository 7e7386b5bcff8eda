//! Data-entry use cases.
//!
//! # Responsibility
//! - Enforce rules that belong to data entry rather than storage: staff-only
//!   authorship, existing authors for comments, tag title normalization.
//! - Keep callers decoupled from repository wiring.

use crate::model::post::PostId;
use crate::model::user::UserId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod comment_service;
pub mod post_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for data-entry use cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Posts may only be authored by staff users.
    AuthorNotStaff { user_id: UserId, username: String },
    /// Referenced user does not exist.
    UnknownUser(UserId),
    /// Target post does not exist.
    PostNotFound(PostId),
    /// Persistence-layer failure, including validation errors.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorNotStaff { user_id, username } => {
                write!(f, "user `{username}` ({user_id}) is not staff and cannot author posts")
            }
            Self::UnknownUser(id) => write!(f, "user not found: {id}"),
            Self::PostNotFound(id) => write!(f, "post not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "post", id } => Self::PostNotFound(id),
            RepoError::NotFound { entity: "user", id } => Self::UnknownUser(id),
            other => Self::Repo(other),
        }
    }
}
