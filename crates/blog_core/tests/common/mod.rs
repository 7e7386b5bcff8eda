#![allow(dead_code)]

use blog_core::{
    Comment, CommentRepository, NewComment, NewPost, NewUser, Post, PostRepository,
    SqliteCommentRepository, SqlitePostRepository, SqliteUserRepository, User, UserRepository,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn staff(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser::new(username, true))
        .unwrap()
}

pub fn reader(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser::new(username, false))
        .unwrap()
}

pub fn draft(author: &User, title: &str, published_at: DateTime<Utc>) -> NewPost {
    NewPost {
        title: title.to_string(),
        text: format!("{title} body"),
        slug: title.to_lowercase().replace(' ', "-"),
        image: format!("covers/{}.png", title.to_lowercase().replace(' ', "_")),
        published_at,
        author_id: author.id,
    }
}

pub fn post(conn: &Connection, author: &User, title: &str, published_at: DateTime<Utc>) -> Post {
    SqlitePostRepository::new(conn)
        .create_post(&draft(author, title, published_at))
        .unwrap()
}

pub fn comment(conn: &Connection, post: &Post, author: &User, published_at: DateTime<Utc>) -> Comment {
    SqliteCommentRepository::new(conn)
        .create_comment(&NewComment {
            post_id: post.id,
            author_id: author.id,
            text: "nice".to_string(),
            published_at,
        })
        .unwrap()
}

pub fn like(conn: &Connection, post: &Post, user: &User) {
    SqlitePostRepository::new(conn)
        .add_like(post.id, user.id)
        .unwrap();
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}
