use chrono::{DateTime, Utc};

/// A row in the `conversations` table, joined with the creator's username.
///
/// `creator_id` never changes after creation; renaming only touches `name`
/// and leaves `created_at` as it was.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub creator_id: i64,
    /// Username of the creator (from the `users` join).
    pub username: String,
}
