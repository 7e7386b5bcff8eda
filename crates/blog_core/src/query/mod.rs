//! Composable read queries over the content store.
//!
//! # Responsibility
//! - Describe post/tag listings as plain values (`PostQuery`, `TagQuery`)
//!   that run only when materialized.
//! - Compute popularity and comment counts with aggregate SQL instead of
//!   per-row lookups.
//!
//! # Invariants
//! - Every `fetch` re-executes SQL and returns a fresh snapshot; query values
//!   hold no cursor or cached rows.
//! - Counts are derived from association rows on each read, never stored.
//! - Filters accumulate; the last ordering call wins.

pub mod comments_count;
pub mod post_query;
pub mod tag_query;

pub use comments_count::{fetch_with_comments_count, PostWithCommentsCount};
pub use post_query::{PostListItem, PostOrdering, PostQuery};
pub use tag_query::{TagOrdering, TagQuery, TagWithPostsCount};

/// SQL source expanding one bound JSON array parameter into id rows.
///
/// Binding the whole id set as a single parameter keeps batch lookups under
/// SQLite's bound-variable limit however many posts are loaded.
pub(crate) const JSON_IDS_SQL: &str = "SELECT value FROM json_each(?1)";

/// Encodes ids as the JSON array bound to [`JSON_IDS_SQL`].
pub(crate) fn ids_json(ids: impl IntoIterator<Item = i64>) -> String {
    serde_json::Value::from(ids.into_iter().collect::<Vec<i64>>()).to_string()
}
