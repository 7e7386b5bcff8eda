//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `posts` plus the `post_tags` and `post_likes`
//!   associations.
//! - Own tag-set replacement (`set_post_tags`, `set_post_tag_titles`) with
//!   atomic semantics: tags created for a failed replacement are rolled back.
//!
//! # Invariants
//! - Default ordering is `published_at DESC, id DESC`.
//! - Returned records carry timestamps at storage (millisecond) precision.
//! - Deleting a post cascades to its comments and association rows through
//!   foreign keys; tags and users are never removed.

use crate::model::post::{NewPost, Post, PostId};
use crate::model::tag::{NewTag, Tag, TagId};
use crate::model::{to_epoch_ms, to_storage_precision};
use crate::model::user::{User, UserId};
use crate::repo::tag_repo::{insert_tag, parse_tag_row};
use crate::repo::user_repo::parse_user_row;
use crate::repo::{parse_timestamp, row_exists, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

pub(crate) const POST_COLUMNS_SQL: &str = "posts.id AS id,
    posts.title AS title,
    posts.text AS text,
    posts.slug AS slug,
    posts.image AS image,
    posts.published_at AS published_at,
    posts.author_id AS author_id";

pub(crate) const POST_DEFAULT_ORDER_SQL: &str = "posts.published_at DESC, posts.id DESC";

/// Repository interface for posts and their associations.
pub trait PostRepository {
    fn create_post(&self, post: &NewPost) -> RepoResult<Post>;
    /// Replaces all fields and returns the record as stored.
    fn update_post(&self, post: &Post) -> RepoResult<Post>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Returns the most recent post with this slug; slugs are not unique.
    fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>>;
    fn delete_post(&self, id: PostId) -> RepoResult<()>;
    /// Replaces the whole tag set of a post in one transaction.
    fn set_post_tags(&self, id: PostId, tag_ids: &[TagId]) -> RepoResult<()>;
    /// Normalizes `titles`, creates missing tags and replaces the post's tag
    /// set, all in one transaction. Returns the new tags ordered by title.
    fn set_post_tag_titles(&self, id: PostId, titles: &[String]) -> RepoResult<Vec<Tag>>;
    /// Tags of one post ordered by title.
    fn post_tags(&self, id: PostId) -> RepoResult<Vec<Tag>>;
    /// Records a like. Liking twice is a no-op.
    fn add_like(&self, id: PostId, user_id: UserId) -> RepoResult<()>;
    fn remove_like(&self, id: PostId, user_id: UserId) -> RepoResult<()>;
    /// Users who liked the post ordered by username.
    fn likers(&self, id: PostId) -> RepoResult<Vec<User>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_post_exists(&self, id: PostId) -> RepoResult<()> {
        if !row_exists(self.conn, "posts", id)? {
            return Err(RepoError::NotFound { entity: "post", id });
        }
        Ok(())
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &NewPost) -> RepoResult<Post> {
        post.validate()?;

        self.conn.execute(
            "INSERT INTO posts (title, text, slug, image, published_at, author_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                post.title.as_str(),
                post.text.as_str(),
                post.slug.as_str(),
                post.image.as_str(),
                to_epoch_ms(post.published_at),
                post.author_id,
            ],
        )?;

        Ok(Post {
            id: self.conn.last_insert_rowid(),
            title: post.title.clone(),
            text: post.text.clone(),
            slug: post.slug.clone(),
            image: post.image.clone(),
            published_at: to_storage_precision(post.published_at),
            author_id: post.author_id,
        })
    }

    fn update_post(&self, post: &Post) -> RepoResult<Post> {
        post.validate()?;

        let changed = self.conn.execute(
            "UPDATE posts
             SET
                title = ?1,
                text = ?2,
                slug = ?3,
                image = ?4,
                published_at = ?5,
                author_id = ?6
             WHERE id = ?7;",
            params![
                post.title.as_str(),
                post.text.as_str(),
                post.slug.as_str(),
                post.image.as_str(),
                to_epoch_ms(post.published_at),
                post.author_id,
                post.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "post",
                id: post.id,
            });
        }
        Ok(Post {
            published_at: to_storage_precision(post.published_at),
            ..post.clone()
        })
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {POST_COLUMNS_SQL} FROM posts WHERE posts.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }
        Ok(None)
    }

    fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS_SQL}
             FROM posts
             WHERE posts.slug = ?1
             ORDER BY {POST_DEFAULT_ORDER_SQL}
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }
        Ok(None)
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM posts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "post", id });
        }
        debug!("event=post_delete module=repo status=ok post_id={id}");
        Ok(())
    }

    fn set_post_tags(&self, id: PostId, tag_ids: &[TagId]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        replace_post_tags(&tx, id, tag_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn set_post_tag_titles(&self, id: PostId, titles: &[String]) -> RepoResult<Vec<Tag>> {
        let mut normalized = BTreeSet::new();
        for title in titles {
            let mut candidate = NewTag::new(title.as_str());
            candidate.clean();
            candidate.validate()?;
            normalized.insert(candidate.title);
        }

        let tx = self.conn.unchecked_transaction()?;
        if !row_exists(&tx, "posts", id)? {
            return Err(RepoError::NotFound { entity: "post", id });
        }
        let mut tags = Vec::with_capacity(normalized.len());
        for title in normalized {
            let existing: Option<TagId> = tx
                .query_row("SELECT id FROM tags WHERE title = ?1;", [title.as_str()], |row| {
                    row.get(0)
                })
                .optional()?;
            let tag = match existing {
                Some(tag_id) => Tag { id: tag_id, title },
                None => insert_tag(&tx, title)?,
            };
            tags.push(tag);
        }
        let tag_ids: Vec<TagId> = tags.iter().map(|tag| tag.id).collect();
        replace_post_tags(&tx, id, &tag_ids)?;
        tx.commit()?;

        debug!(
            "event=post_tags_replace module=repo status=ok post_id={id} tags={}",
            tags.len()
        );
        Ok(tags)
    }

    fn post_tags(&self, id: PostId) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT tags.id AS id, tags.title AS title
             FROM post_tags
             INNER JOIN tags ON tags.id = post_tags.tag_id
             WHERE post_tags.post_id = ?1
             ORDER BY tags.title ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn add_like(&self, id: PostId, user_id: UserId) -> RepoResult<()> {
        self.ensure_post_exists(id)?;
        if !row_exists(self.conn, "users", user_id)? {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?1, ?2);",
            params![id, user_id],
        )?;
        Ok(())
    }

    fn remove_like(&self, id: PostId, user_id: UserId) -> RepoResult<()> {
        self.ensure_post_exists(id)?;
        self.conn.execute(
            "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2;",
            params![id, user_id],
        )?;
        Ok(())
    }

    fn likers(&self, id: PostId) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT users.id AS id, users.username AS username, users.is_staff AS is_staff
             FROM post_likes
             INNER JOIN users ON users.id = post_likes.user_id
             WHERE post_likes.post_id = ?1
             ORDER BY users.username ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }
}

fn replace_post_tags(conn: &Connection, id: PostId, tag_ids: &[TagId]) -> RepoResult<()> {
    if !row_exists(conn, "posts", id)? {
        return Err(RepoError::NotFound { entity: "post", id });
    }

    conn.execute("DELETE FROM post_tags WHERE post_id = ?1;", [id])?;
    for tag_id in tag_ids {
        if !row_exists(conn, "tags", *tag_id)? {
            return Err(RepoError::NotFound {
                entity: "tag",
                id: *tag_id,
            });
        }
        conn.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?1, ?2);",
            params![id, tag_id],
        )?;
    }
    Ok(())
}

pub(crate) fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let post = Post {
        id: row.get("id")?,
        title: row.get("title")?,
        text: row.get("text")?,
        slug: row.get("slug")?,
        image: row.get("image")?,
        published_at: parse_timestamp("posts", "published_at", row.get("published_at")?)?,
        author_id: row.get("author_id")?,
    };
    post.validate()
        .map_err(|err| RepoError::InvalidData(format!("post {}: {err}", post.id)))?;
    Ok(post)
}
