//! Post listing query builder.
//!
//! ```no_run
//! # fn demo(conn: &rusqlite::Connection) -> blog_core::RepoResult<()> {
//! use blog_core::PostQuery;
//!
//! let archive = PostQuery::new().year(2023);
//! let first_pass = archive.fetch(conn)?;
//! let second_pass = archive.fetch(conn)?; // re-queried, fresh snapshot
//! # let _ = (first_pass, second_pass);
//! # Ok(())
//! # }
//! ```

use crate::model::post::{Post, PostId};
use crate::model::tag::normalize_tag_title;
use crate::query::{ids_json, JSON_IDS_SQL};
use crate::query::tag_query::{parse_tag_with_count_row, TagWithPostsCount};
use crate::repo::post_repo::{parse_post_row, POST_COLUMNS_SQL};
use crate::repo::{RepoError, RepoResult};
use chrono::{TimeZone, Utc};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::collections::HashMap;

/// Sort order applied by [`PostQuery`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrdering {
    /// Store default: most recent first.
    #[default]
    Default,
    /// Oldest first, as used by the yearly archive.
    PublishedAsc,
    /// Most recent first.
    PublishedDesc,
    /// Most liked first; ties fall back to most recent first.
    Popularity,
}

impl PostOrdering {
    fn order_by_sql(self) -> &'static str {
        match self {
            Self::Default | Self::PublishedDesc => "posts.published_at DESC, posts.id DESC",
            Self::PublishedAsc => "posts.published_at ASC, posts.id ASC",
            Self::Popularity => "likes_count DESC, posts.published_at DESC, posts.id DESC",
        }
    }
}

/// One row of a post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostListItem {
    pub post: Post,
    /// Distinct likers; set only when ranking by popularity.
    pub likes_count: Option<u64>,
    /// Post tags with per-tag post counts; set only with `prefetch_tags`.
    pub tags: Option<Vec<TagWithPostsCount>>,
}

/// Lazy, restartable description of a post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    year: Option<i32>,
    tag: Option<String>,
    ordering: PostOrdering,
    prefetch_tags: bool,
    limit: Option<u32>,
}

impl PostQuery {
    /// All posts in default ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps posts published in calendar year `year` (UTC), oldest first.
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self.ordering = PostOrdering::PublishedAsc;
        self
    }

    /// Orders most recent first.
    pub fn fresh(mut self) -> Self {
        self.ordering = PostOrdering::PublishedDesc;
        self
    }

    /// Ranks by number of distinct likes, most liked first.
    pub fn popular(mut self) -> Self {
        self.ordering = PostOrdering::Popularity;
        self
    }

    /// Keeps posts carrying the tag `title` (case-insensitive).
    pub fn tagged(mut self, title: &str) -> Self {
        self.tag = Some(normalize_tag_title(title));
        self
    }

    /// Loads every post's tags, each annotated with its post count, in one
    /// extra query per fetch.
    pub fn prefetch_tags(mut self) -> Self {
        self.prefetch_tags = true;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn ordering(&self) -> PostOrdering {
        self.ordering
    }

    /// Runs the query and returns annotated rows.
    pub fn fetch(&self, conn: &Connection) -> RepoResult<Vec<PostListItem>> {
        let popular = self.ordering == PostOrdering::Popularity;
        let (filter_sql, mut bind_values) = self.filter_sql();

        let mut sql = format!("SELECT {POST_COLUMNS_SQL}");
        if popular {
            sql.push_str(
                ", (SELECT COUNT(*) FROM post_likes WHERE post_likes.post_id = posts.id)
                   AS likes_count",
            );
        }
        sql.push_str(" FROM posts");
        sql.push_str(&filter_sql);
        sql.push_str(" ORDER BY ");
        sql.push_str(self.ordering.order_by_sql());
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let likes_count = if popular {
                Some(parse_count("likes_count", row.get("likes_count")?)?)
            } else {
                None
            };
            items.push(PostListItem {
                post: parse_post_row(row)?,
                likes_count,
                tags: None,
            });
        }

        if self.prefetch_tags {
            attach_tags(conn, &mut items)?;
        }

        debug!(
            "event=post_query module=query status=ok ordering={:?} rows={}",
            self.ordering,
            items.len()
        );
        Ok(items)
    }

    /// Runs the query and drops annotations.
    pub fn fetch_posts(&self, conn: &Connection) -> RepoResult<Vec<Post>> {
        Ok(self.fetch(conn)?.into_iter().map(|item| item.post).collect())
    }

    /// First row of the listing, if any.
    pub fn first(&self, conn: &Connection) -> RepoResult<Option<PostListItem>> {
        Ok(self.clone().limit(1).fetch(conn)?.into_iter().next())
    }

    /// Number of rows the listing would return.
    pub fn count(&self, conn: &Connection) -> RepoResult<u64> {
        let (filter_sql, bind_values) = self.filter_sql();
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM posts{filter_sql}"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        let total = parse_count("count", total)?;
        Ok(match self.limit {
            Some(limit) => total.min(u64::from(limit)),
            None => total,
        })
    }

    fn filter_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(" WHERE 1 = 1");
        let mut bind_values = Vec::new();

        if let Some(year) = self.year {
            match year_bounds_ms(year) {
                Some((start, end)) => {
                    sql.push_str(" AND posts.published_at >= ? AND posts.published_at < ?");
                    bind_values.push(Value::Integer(start));
                    bind_values.push(Value::Integer(end));
                }
                None => sql.push_str(" AND 0 = 1"),
            }
        }

        if let Some(tag) = self.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM post_tags
                    INNER JOIN tags ON tags.id = post_tags.tag_id
                    WHERE post_tags.post_id = posts.id
                      AND tags.title = ?
                )",
            );
            bind_values.push(Value::Text(tag.clone()));
        }

        (sql, bind_values)
    }
}

/// Half-open `[start, end)` epoch-millisecond range covering a UTC year.
///
/// Returns `None` when the year start is not representable.
pub fn year_bounds_ms(year: i32) -> Option<(i64, i64)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = year
        .checked_add(1)
        .and_then(|next| Utc.with_ymd_and_hms(next, 1, 1, 0, 0, 0).single())
        .map_or(i64::MAX, |end| end.timestamp_millis());
    Some((start.timestamp_millis(), end))
}

fn attach_tags(conn: &Connection, items: &mut [PostListItem]) -> RepoResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT
            post_tags.post_id AS post_id,
            tags.id AS id,
            tags.title AS title,
            (SELECT COUNT(*) FROM post_tags counted WHERE counted.tag_id = tags.id)
                AS posts_count
         FROM post_tags
         INNER JOIN tags ON tags.id = post_tags.tag_id
         WHERE post_tags.post_id IN ({JSON_IDS_SQL})
         ORDER BY tags.title ASC;"
    ))?;
    let mut rows = stmt.query([ids_json(items.iter().map(|item| item.post.id))])?;
    let mut by_post: HashMap<PostId, Vec<TagWithPostsCount>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let post_id: PostId = row.get("post_id")?;
        by_post
            .entry(post_id)
            .or_default()
            .push(parse_tag_with_count_row(row)?);
    }

    for item in items.iter_mut() {
        item.tags = Some(by_post.get(&item.post.id).cloned().unwrap_or_default());
    }
    Ok(())
}

pub(crate) fn parse_count(column: &str, value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative aggregate `{value}` in {column}")))
}
