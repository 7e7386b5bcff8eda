//! Tag repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Every write runs `NewTag::clean` then `NewTag::validate`.
//! - Duplicate titles surface as `ValidationError::DuplicateTagTitle`, both
//!   from the pre-insert check and from the `UNIQUE` constraint.
//! - Deleting a tag removes only `post_tags` rows, never posts.

use crate::model::post::Post;
use crate::model::tag::{normalize_tag_title, NewTag, Tag, TagId};
use crate::model::validation::ValidationError;
use crate::repo::post_repo::{parse_post_row, POST_COLUMNS_SQL, POST_DEFAULT_ORDER_SQL};
use crate::repo::{is_unique_violation, RepoError, RepoResult};
use rusqlite::{Connection, Row};

/// Repository interface for tags.
pub trait TagRepository {
    /// Normalizes, validates and inserts one tag.
    fn create_tag(&self, tag: &NewTag) -> RepoResult<Tag>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Looks a tag up by title after lowercase normalization.
    fn get_tag_by_title(&self, title: &str) -> RepoResult<Option<Tag>>;
    fn get_or_create_tag(&self, title: &str) -> RepoResult<Tag>;
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
    /// All tags ordered by title.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Posts carrying the tag in default post ordering.
    fn tag_posts(&self, id: TagId) -> RepoResult<Vec<Post>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn create_tag(&self, tag: &NewTag) -> RepoResult<Tag> {
        let mut cleaned = tag.clone();
        cleaned.clean();
        cleaned.validate()?;

        if self.get_tag_by_title(&cleaned.title)?.is_some() {
            return Err(ValidationError::DuplicateTagTitle(cleaned.title).into());
        }

        insert_tag(self.conn, cleaned.title)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM tags WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tag_row(row)?));
        }
        Ok(None)
    }

    fn get_tag_by_title(&self, title: &str) -> RepoResult<Option<Tag>> {
        let normalized = normalize_tag_title(title);
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM tags WHERE title = ?1;")?;
        let mut rows = stmt.query([normalized.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tag_row(row)?));
        }
        Ok(None)
    }

    fn get_or_create_tag(&self, title: &str) -> RepoResult<Tag> {
        if let Some(existing) = self.get_tag_by_title(title)? {
            return Ok(existing);
        }
        self.create_tag(&NewTag::new(title))
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "tag", id });
        }
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM tags ORDER BY title ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn tag_posts(&self, id: TagId) -> RepoResult<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS_SQL}
             FROM posts
             INNER JOIN post_tags ON post_tags.post_id = posts.id
             WHERE post_tags.tag_id = ?1
             ORDER BY {POST_DEFAULT_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([id])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }
        Ok(posts)
    }
}

/// Inserts an already cleaned and validated title.
pub(crate) fn insert_tag(conn: &Connection, title: String) -> RepoResult<Tag> {
    if let Err(err) = conn.execute("INSERT INTO tags (title) VALUES (?1);", [title.as_str()]) {
        if is_unique_violation(&err) {
            return Err(ValidationError::DuplicateTagTitle(title).into());
        }
        return Err(err.into());
    }

    Ok(Tag {
        id: conn.last_insert_rowid(),
        title,
    })
}

pub(crate) fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let title: String = row.get("title")?;
    if title != normalize_tag_title(&title) {
        return Err(RepoError::InvalidData(format!(
            "tag title `{title}` is not normalized in tags.title"
        )));
    }
    Ok(Tag {
        id: row.get("id")?,
        title,
    })
}
