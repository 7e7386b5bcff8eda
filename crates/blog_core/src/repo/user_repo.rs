//! User reference repository.
//!
//! Users come from an external identity provider; this repository only
//! mirrors the rows posts and comments point at.

use crate::model::user::{NewUser, User, UserId};
use crate::model::validation::ValidationError;
use crate::repo::{bool_to_int, is_unique_violation, parse_bool, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str =
    "SELECT users.id AS id, users.username AS username, users.is_staff AS is_staff FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, filter: &str, value: Value) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO users (username, is_staff) VALUES (?1, ?2);",
            params![user.username.as_str(), bool_to_int(user.is_staff)],
        );
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(ValidationError::DuplicateUsername(user.username.clone()).into());
            }
            return Err(err.into());
        }

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: user.username.clone(),
            is_staff: user.is_staff,
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.find_one("users.id", Value::Integer(id))
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.find_one("users.username", Value::Text(username.to_string()))
    }
}

pub(crate) fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        is_staff: parse_bool("users", "is_staff", row.get("is_staff")?)?,
    })
}
