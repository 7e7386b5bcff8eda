//! Tag listing query builder.

use crate::model::tag::Tag;
use crate::query::post_query::parse_count;
use crate::repo::tag_repo::parse_tag_row;
use crate::repo::RepoResult;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

/// Tag annotated with the number of posts carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagWithPostsCount {
    pub tag: Tag,
    pub posts_count: u64,
}

/// Sort order applied by [`TagQuery`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagOrdering {
    #[default]
    Title,
    /// Most used first; ties by title.
    Popularity,
}

/// Lazy, restartable description of a tag listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    ordering: TagOrdering,
    limit: Option<u32>,
}

impl TagQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranks tags by associated post count, most used first.
    pub fn popular(mut self) -> Self {
        self.ordering = TagOrdering::Popularity;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn fetch(&self, conn: &Connection) -> RepoResult<Vec<TagWithPostsCount>> {
        let mut sql = String::from(
            "SELECT
                tags.id AS id,
                tags.title AS title,
                (SELECT COUNT(*) FROM post_tags WHERE post_tags.tag_id = tags.id) AS posts_count
             FROM tags",
        );
        sql.push_str(match self.ordering {
            TagOrdering::Title => " ORDER BY tags.title ASC",
            TagOrdering::Popularity => " ORDER BY posts_count DESC, tags.title ASC",
        });
        let mut bind_values = Vec::new();
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_with_count_row(row)?);
        }

        debug!(
            "event=tag_query module=query status=ok ordering={:?} rows={}",
            self.ordering,
            tags.len()
        );
        Ok(tags)
    }
}

pub(crate) fn parse_tag_with_count_row(row: &Row<'_>) -> RepoResult<TagWithPostsCount> {
    Ok(TagWithPostsCount {
        tag: parse_tag_row(row)?,
        posts_count: parse_count("posts_count", row.get("posts_count")?)?,
    })
}
