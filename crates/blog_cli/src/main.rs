//! blog - inspect the blog content store from a terminal.
//!
//! ```bash
//! # Popular posts of 2023 with their tags
//! blog posts --year 2023 --popular --with-tags
//!
//! # Admin list view for comments, as JSON
//! blog --json admin comment
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
