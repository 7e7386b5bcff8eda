//! List-view rows and raw-identifier labels.

use crate::admin::registry::{AdminRegistry, EntityKind, LABEL_FIELD};
use crate::admin::{AdminError, AdminResult};
use crate::model::comment::{comment_label, Comment};
use crate::model::post::{Post, PostId};
use crate::model::tag::Tag;
use crate::model::user::UserId;
use crate::query::PostQuery;
use crate::repo::comment_repo::{CommentRepository, SqliteCommentRepository};
use crate::repo::post_repo::{PostRepository, SqlitePostRepository};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MISSING_LABEL: &str = "-";

/// One list-view row: primary key plus rendered `list_display` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminRow {
    pub id: i64,
    pub columns: Vec<String>,
}

/// Renders the list view for `kind` in the entity's default ordering.
pub fn list_rows(
    conn: &Connection,
    registry: &AdminRegistry,
    kind: EntityKind,
) -> AdminResult<Vec<AdminRow>> {
    let config = registry.get(kind)?;
    let mut labels = LabelCache::new(conn);

    let mut rows = Vec::new();
    match kind {
        EntityKind::Post => {
            for post in PostQuery::new().fetch_posts(conn)? {
                let columns = config
                    .list_display
                    .iter()
                    .map(|field| render_post_field(&post, field, &mut labels))
                    .collect::<AdminResult<Vec<_>>>()?;
                rows.push(AdminRow {
                    id: post.id,
                    columns,
                });
            }
        }
        EntityKind::Tag => {
            for tag in SqliteTagRepository::new(conn).list_tags()? {
                let columns = config
                    .list_display
                    .iter()
                    .map(|field| render_tag_field(&tag, field))
                    .collect::<AdminResult<Vec<_>>>()?;
                rows.push(AdminRow {
                    id: tag.id,
                    columns,
                });
            }
        }
        EntityKind::Comment => {
            for comment in SqliteCommentRepository::new(conn).list_comments()? {
                let columns = config
                    .list_display
                    .iter()
                    .map(|field| render_comment_field(&comment, field, &mut labels))
                    .collect::<AdminResult<Vec<_>>>()?;
                rows.push(AdminRow {
                    id: comment.id,
                    columns,
                });
            }
        }
    }
    Ok(rows)
}

/// Resolves the label shown next to a raw-identifier picker.
///
/// Returns `Ok(None)` when `id` does not reference an existing row.
pub fn raw_id_label(
    conn: &Connection,
    registry: &AdminRegistry,
    kind: EntityKind,
    field: &str,
    id: i64,
) -> AdminResult<Option<String>> {
    let config = registry.get(kind)?;
    if !config.raw_id_fields.iter().any(|candidate| *candidate == field) {
        if kind.field_kind(field).is_none() {
            return Err(unknown_field(kind, field));
        }
        return Err(AdminError::NotRawIdField {
            kind,
            field: field.to_string(),
        });
    }

    let label = match (kind, field) {
        (EntityKind::Post, "author" | "likes") | (EntityKind::Comment, "author") => {
            SqliteUserRepository::new(conn)
                .get_user(id)?
                .map(|user| user.username)
        }
        (EntityKind::Post, "tags") => SqliteTagRepository::new(conn)
            .get_tag(id)?
            .map(|tag| tag.title),
        (EntityKind::Comment, "post") => SqlitePostRepository::new(conn)
            .get_post(id)?
            .map(|post| post.title),
        _ => {
            return Err(AdminError::NotRelationField {
                kind,
                field: field.to_string(),
            })
        }
    };
    Ok(label)
}

/// Per-render memo of related-row labels, so a list of N rows sharing the
/// same author issues one user lookup.
struct LabelCache<'conn> {
    conn: &'conn Connection,
    usernames: HashMap<UserId, String>,
    post_titles: HashMap<PostId, String>,
}

impl<'conn> LabelCache<'conn> {
    fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            usernames: HashMap::new(),
            post_titles: HashMap::new(),
        }
    }

    fn username(&mut self, id: UserId) -> AdminResult<String> {
        if let Some(name) = self.usernames.get(&id) {
            return Ok(name.clone());
        }
        let name = SqliteUserRepository::new(self.conn)
            .get_user(id)?
            .map_or_else(|| MISSING_LABEL.to_string(), |user| user.username);
        self.usernames.insert(id, name.clone());
        Ok(name)
    }

    fn post_title(&mut self, id: PostId) -> AdminResult<String> {
        if let Some(title) = self.post_titles.get(&id) {
            return Ok(title.clone());
        }
        let title = SqlitePostRepository::new(self.conn)
            .get_post(id)?
            .map_or_else(|| MISSING_LABEL.to_string(), |post| post.title);
        self.post_titles.insert(id, title.clone());
        Ok(title)
    }
}

fn render_post_field(post: &Post, field: &str, labels: &mut LabelCache<'_>) -> AdminResult<String> {
    Ok(match field {
        "id" => post.id.to_string(),
        "title" | LABEL_FIELD => post.title.clone(),
        "text" => post.text.clone(),
        "slug" => post.slug.clone(),
        "image" => post.image.clone(),
        "published_at" => format_timestamp(post.published_at),
        "author" => labels.username(post.author_id)?,
        other => return Err(unknown_field(EntityKind::Post, other)),
    })
}

fn render_tag_field(tag: &Tag, field: &str) -> AdminResult<String> {
    Ok(match field {
        "id" => tag.id.to_string(),
        "title" | LABEL_FIELD => tag.title.clone(),
        other => return Err(unknown_field(EntityKind::Tag, other)),
    })
}

fn render_comment_field(
    comment: &Comment,
    field: &str,
    labels: &mut LabelCache<'_>,
) -> AdminResult<String> {
    Ok(match field {
        "id" => comment.id.to_string(),
        "text" => comment.text.clone(),
        "published_at" => format_timestamp(comment.published_at),
        "author" => labels.username(comment.author_id)?,
        "post" => labels.post_title(comment.post_id)?,
        LABEL_FIELD => {
            let username = labels.username(comment.author_id)?;
            let title = labels.post_title(comment.post_id)?;
            comment_label(&username, &title)
        }
        other => return Err(unknown_field(EntityKind::Comment, other)),
    })
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn unknown_field(kind: EntityKind, field: &str) -> AdminError {
    AdminError::UnknownField {
        kind,
        field: field.to_string(),
    }
}
