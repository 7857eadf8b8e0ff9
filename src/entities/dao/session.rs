use chrono::{DateTime, Utc};

/// A row in the `sessions` table: one server-side login session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque v4 UUID handed to the client as a cookie / bearer token.
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
