use chrono::{DateTime, Utc};

/// A row in the `users` table.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// `"<salt-hex>$<sha256(salt || password)-hex>"`, see [`crate::password`].
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
