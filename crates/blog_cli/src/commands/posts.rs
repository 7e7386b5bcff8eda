//! Posts command
//!
//! Lists posts through `PostQuery`, optionally with tags and comment counts.

use anyhow::{Context, Result};
use blog_core::{fetch_with_comments_count, PostListItem, PostQuery};
use clap::Args;
use rusqlite::Connection;
use serde::Serialize;

use super::Output;

/// Arguments for the posts command
#[derive(Debug, Args)]
pub struct PostsArgs {
    /// Only posts published in this year, oldest first
    #[arg(long)]
    pub year: Option<i32>,

    /// Rank by number of likes
    #[arg(long)]
    pub popular: bool,

    /// Only posts carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Maximum number of posts
    #[arg(long)]
    pub limit: Option<u32>,

    /// Include each post's tags with their post counts
    #[arg(long)]
    pub with_tags: bool,

    /// Include each post's comment count
    #[arg(long)]
    pub with_comments: bool,
}

impl PostsArgs {
    fn query(&self) -> PostQuery {
        let mut query = PostQuery::new();
        if let Some(year) = self.year {
            query = query.year(year);
        }
        if self.popular {
            query = query.popular();
        }
        if let Some(tag) = &self.tag {
            query = query.tagged(tag);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if self.with_tags {
            query = query.prefetch_tags();
        }
        query
    }
}

#[derive(Debug, Serialize)]
struct PostRow {
    #[serde(flatten)]
    item: PostListItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments_count: Option<u64>,
}

/// Execute the posts command
pub fn execute(conn: &Connection, args: PostsArgs, output: Output) -> Result<()> {
    let items = args
        .query()
        .fetch(conn)
        .context("Failed to list posts")?;

    let comment_counts: Vec<Option<u64>> = if args.with_comments {
        let posts = items.iter().map(|item| item.post.clone()).collect();
        fetch_with_comments_count(conn, posts)
            .context("Failed to count comments")?
            .into_iter()
            .map(|counted| Some(counted.comments_count))
            .collect()
    } else {
        vec![None; items.len()]
    };

    let rows: Vec<PostRow> = items
        .into_iter()
        .zip(comment_counts)
        .map(|(item, comments_count)| PostRow {
            item,
            comments_count,
        })
        .collect();

    output.emit(&rows, || rows.iter().map(render_line).collect())
}

fn render_line(row: &PostRow) -> String {
    let post = &row.item.post;
    let mut line = format!(
        "{}  {}  {}",
        post.published_at.format("%Y-%m-%d"),
        post.title,
        post.absolute_url()
    );
    if let Some(likes) = row.item.likes_count {
        line.push_str(&format!("  likes={likes}"));
    }
    if let Some(comments) = row.comments_count {
        line.push_str(&format!("  comments={comments}"));
    }
    if let Some(tags) = &row.item.tags {
        let rendered: Vec<String> = tags
            .iter()
            .map(|tag| format!("{}({})", tag.tag.title, tag.posts_count))
            .collect();
        line.push_str(&format!("  tags=[{}]", rendered.join(", ")));
    }
    line
}
