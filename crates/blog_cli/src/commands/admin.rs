//! Admin commands
//!
//! Render list views and raw-id labels from the default blog registry.

use anyhow::{Context, Result};
use blog_core::{list_rows, raw_id_label, AdminRegistry, EntityKind};
use clap::Args;
use rusqlite::Connection;

use super::Output;

/// Arguments for the admin list-view command
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Entity to list: post, tag or comment
    pub kind: EntityKind,
}

/// Arguments for the raw-id label command
#[derive(Debug, Args)]
pub struct AdminLabelArgs {
    /// Entity owning the field: post, tag or comment
    pub kind: EntityKind,

    /// Raw-id field name, e.g. `author`
    pub field: String,

    /// Identifier typed into the picker
    pub id: i64,
}

/// Execute the admin list-view command
pub fn execute(conn: &Connection, args: AdminArgs, output: Output) -> Result<()> {
    let registry = AdminRegistry::blog_default()?;
    let config = registry.get(args.kind)?;
    let rows = list_rows(conn, &registry, args.kind)
        .with_context(|| format!("Failed to render {} list", args.kind))?;

    output.emit(&rows, || {
        let mut lines = vec![format!("id  {}", config.list_display.join("  "))];
        lines.extend(
            rows.iter()
                .map(|row| format!("{}  {}", row.id, row.columns.join("  "))),
        );
        lines
    })
}

/// Execute the raw-id label command
pub fn execute_label(conn: &Connection, args: AdminLabelArgs, output: Output) -> Result<()> {
    let registry = AdminRegistry::blog_default()?;
    let label = raw_id_label(conn, &registry, args.kind, &args.field, args.id)?;

    output.emit(&label, || {
        vec![label.clone().unwrap_or_else(|| format!("no row with id {}", args.id))]
    })
}
