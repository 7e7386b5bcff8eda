//! CLI commands.
//!
//! # Responsibility
//! - Parse arguments, load `.env` and environment configuration.
//! - Start file logging when a log directory is configured.
//! - Open an existing content store (never creating one) and dispatch to
//!   one read-only command.

pub mod admin;
pub mod posts;
pub mod tags;

use anyhow::{Context, Result};
use blog_core::{db::open_existing_db, init_logging, BlogConfig};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

/// blog - query posts, tags and admin views of a blog database
#[derive(Debug, Parser)]
#[command(name = "blog")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database file (overrides BLOG_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List posts
    Posts(posts::PostsArgs),

    /// List tags
    Tags(tags::TagsArgs),

    /// Render the admin list view of an entity
    Admin(admin::AdminArgs),

    /// Resolve the label shown next to a raw-id picker
    AdminLabel(admin::AdminLabelArgs),
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();
    let config = BlogConfig::from_env().context("Failed to read configuration")?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir).context("Failed to start logging")?;
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    let conn = open_existing_db(&db_path).context("Failed to open database")?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        db_path.display()
    );

    let output = Output { json: cli.json };
    match cli.command {
        Commands::Posts(args) => posts::execute(&conn, args, output),
        Commands::Tags(args) => tags::execute(&conn, args, output),
        Commands::Admin(args) => admin::execute(&conn, args, output),
        Commands::AdminLabel(args) => admin::execute_label(&conn, args, output),
    }
}

/// Output mode shared by all commands.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Prints `value` as pretty JSON, or each text line otherwise.
    pub fn emit<T: Serialize>(self, value: &T, lines: impl FnOnce() -> Vec<String>) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            for line in lines() {
                println!("{line}");
            }
        }
        Ok(())
    }
}
