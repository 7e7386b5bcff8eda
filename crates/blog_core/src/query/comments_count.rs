//! Batched comment counts for already-loaded posts.
//!
//! # Invariants
//! - One aggregate query with one bound parameter per call, regardless of
//!   input size.
//! - Output keeps input order and length.
//! - A post missing from the aggregate result (deleted after the caller
//!   loaded it) gets a count of `0` and a warning log, not an error.

use crate::model::post::{Post, PostId};
use crate::query::{ids_json, JSON_IDS_SQL};
use crate::query::post_query::parse_count;
use crate::repo::RepoResult;
use log::warn;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Post paired with its comment count at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostWithCommentsCount {
    pub post: Post,
    pub comments_count: u64,
}

/// Attaches comment counts to `posts` with a single grouped query.
pub fn fetch_with_comments_count(
    conn: &Connection,
    posts: Vec<Post>,
) -> RepoResult<Vec<PostWithCommentsCount>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let ids: BTreeSet<PostId> = posts.iter().map(|post| post.id).collect();
    let mut stmt = conn.prepare(&format!(
        "SELECT posts.id AS id, COUNT(comments.id) AS comments_count
         FROM posts
         LEFT JOIN comments ON comments.post_id = posts.id
         WHERE posts.id IN ({JSON_IDS_SQL})
         GROUP BY posts.id;"
    ))?;
    let mut rows = stmt.query([ids_json(ids)])?;
    let mut count_for_id: HashMap<PostId, u64> = HashMap::new();
    while let Some(row) = rows.next()? {
        let id: PostId = row.get("id")?;
        let count = parse_count("comments_count", row.get("comments_count")?)?;
        count_for_id.insert(id, count);
    }

    Ok(posts
        .into_iter()
        .map(|post| {
            let comments_count = count_for_id.get(&post.id).copied().unwrap_or_else(|| {
                warn!(
                    "event=comments_count module=query status=missing post_id={}",
                    post.id
                );
                0
            });
            PostWithCommentsCount {
                post,
                comments_count,
            }
        })
        .collect())
}
