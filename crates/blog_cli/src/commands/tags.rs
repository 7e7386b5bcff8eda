//! Tags command

use anyhow::{Context, Result};
use blog_core::TagQuery;
use clap::Args;
use rusqlite::Connection;

use super::Output;

/// Arguments for the tags command
#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Most used tags first
    #[arg(long)]
    pub popular: bool,

    /// Maximum number of tags
    #[arg(long)]
    pub limit: Option<u32>,
}

/// Execute the tags command
pub fn execute(conn: &Connection, args: TagsArgs, output: Output) -> Result<()> {
    let mut query = TagQuery::new();
    if args.popular {
        query = query.popular();
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    let tags = query.fetch(conn).context("Failed to list tags")?;

    output.emit(&tags, || {
        tags.iter()
            .map(|row| format!("{}  posts={}", row.tag.title, row.posts_count))
            .collect()
    })
}
