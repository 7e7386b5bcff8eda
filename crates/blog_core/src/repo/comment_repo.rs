//! Comment repository contracts and SQLite implementation.
//!
//! Comments list oldest-first, matching reading order under a post.

use crate::model::comment::{comment_label, Comment, CommentId, NewComment};
use crate::model::post::PostId;
use crate::model::{to_epoch_ms, to_storage_precision};
use crate::repo::{parse_timestamp, row_exists, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COMMENT_SELECT_SQL: &str = "SELECT
    comments.id AS id,
    comments.post_id AS post_id,
    comments.author_id AS author_id,
    comments.text AS text,
    comments.published_at AS published_at
FROM comments";

/// Repository interface for comments.
pub trait CommentRepository {
    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Comments of one post, oldest first.
    fn list_for_post(&self, post_id: PostId) -> RepoResult<Vec<Comment>>;
    /// Every comment, oldest first.
    fn list_comments(&self) -> RepoResult<Vec<Comment>>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
    /// `"{author} under {post title}"` label, `None` when the comment is gone.
    fn comment_label(&self, id: CommentId) -> RepoResult<Option<String>>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment> {
        comment.validate()?;
        if !row_exists(self.conn, "posts", comment.post_id)? {
            return Err(RepoError::NotFound {
                entity: "post",
                id: comment.post_id,
            });
        }

        self.conn.execute(
            "INSERT INTO comments (post_id, author_id, text, published_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                comment.post_id,
                comment.author_id,
                comment.text.as_str(),
                to_epoch_ms(comment.published_at),
            ],
        )?;

        Ok(Comment {
            id: self.conn.last_insert_rowid(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text.clone(),
            published_at: to_storage_precision(comment.published_at),
        })
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE comments.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn list_for_post(&self, post_id: PostId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE comments.post_id = ?1
             ORDER BY comments.published_at ASC, comments.id ASC;"
        ))?;
        let mut rows = stmt.query([post_id])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn list_comments(&self) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL} ORDER BY comments.published_at ASC, comments.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id,
            });
        }
        Ok(())
    }

    fn comment_label(&self, id: CommentId) -> RepoResult<Option<String>> {
        let names = self
            .conn
            .query_row(
                "SELECT users.username, posts.title
                 FROM comments
                 INNER JOIN users ON users.id = comments.author_id
                 INNER JOIN posts ON posts.id = comments.post_id
                 WHERE comments.id = ?1;",
                [id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(names.map(|(username, title)| comment_label(&username, &title)))
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        post_id: row.get("post_id")?,
        author_id: row.get("author_id")?,
        text: row.get("text")?,
        published_at: parse_timestamp("comments", "published_at", row.get("published_at")?)?,
    })
}
