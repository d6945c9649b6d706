//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `users.email` and `users.handle` are UNIQUE; violations surface as
//!   `RepoError::UniqueViolation` naming the field.

use crate::model::now_epoch_ms;
use crate::model::user::{NewUser, User, UserId};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT id, email, handle, created_at FROM users";

/// Repository interface for user records.
pub trait UserRepository {
    /// Inserts one user and returns the stored row.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    /// Loads one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Loads one user by normalized email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            handle: user.handle.clone(),
            created_at: now_epoch_ms(),
        };

        self.conn
            .execute(
                "INSERT INTO users (id, email, handle, created_at) VALUES (?1, ?2, ?3, ?4);",
                params![
                    created.id.to_string(),
                    created.email.as_str(),
                    created.handle.as_str(),
                    created.created_at,
                ],
            )
            .map_err(map_unique_violation)?;

        Ok(created)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_user_columns,
            )
            .optional()?
            .map(UserColumns::into_user)
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
                [email],
                read_user_columns,
            )
            .optional()?
            .map(UserColumns::into_user)
            .transpose()
    }
}

struct UserColumns {
    id: String,
    email: String,
    handle: String,
    created_at: i64,
}

impl UserColumns {
    fn into_user(self) -> RepoResult<User> {
        Ok(User {
            id: parse_uuid(&self.id, "users.id")?,
            email: self.email,
            handle: self.handle,
            created_at: self.created_at,
        })
    }
}

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<UserColumns> {
    Ok(UserColumns {
        id: row.get("id")?,
        email: row.get("email")?,
        handle: row.get("handle")?,
        created_at: row.get("created_at")?,
    })
}

fn map_unique_violation(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            if message.contains("users.email") {
                return RepoError::UniqueViolation { field: "email" };
            }
            if message.contains("users.handle") {
                return RepoError::UniqueViolation { field: "handle" };
            }
        }
    }
    err.into()
}
