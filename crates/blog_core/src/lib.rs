//! Data layer for a blogging application.
//!
//! Posts, tags and comments live in SQLite (`db`, `repo`); listings are
//! described as query values (`query`); data-entry rules live in `service`;
//! the admin surface is an explicit registration table (`admin`).

pub mod admin;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use admin::{
    list_rows, raw_id_label, AdminConfig, AdminError, AdminRegistry, AdminResult, AdminRow,
    EntityKind,
};
pub use config::{BlogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::comment::{Comment, CommentId, NewComment};
pub use model::post::{NewPost, Post, PostId};
pub use model::tag::{NewTag, Tag, TagId};
pub use model::user::{NewUser, User, UserId};
pub use model::validation::ValidationError;
pub use query::{
    fetch_with_comments_count, PostListItem, PostOrdering, PostQuery, PostWithCommentsCount,
    TagOrdering, TagQuery, TagWithPostsCount,
};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::comment_service::CommentService;
pub use service::post_service::PostService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
