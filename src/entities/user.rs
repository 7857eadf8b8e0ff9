use std::future::Future;

use chrono::Utc;

use crate::entities::{SqliteStore, dao::User, parse_timestamp};

pub trait UserStore: Send + Sync + 'static {
    /// Insert a new user and return its generated id. A unique-constraint
    /// violation on `username` surfaces as `sqlx::Error::Database`; the
    /// caller decides how to report it.
    fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;

    fn find_user_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

impl UserStore for SqliteStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }
}

fn from_row((id, username, password_hash, created_at): (i64, String, String, String)) -> User {
    User {
        id,
        username,
        password_hash,
        created_at: parse_timestamp(&created_at),
    }
}
