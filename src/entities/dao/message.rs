use chrono::{DateTime, Utc};

/// A single message row in the `messages` table.
///
/// Messages are immutable once created and are destroyed only when their
/// owning conversation is deleted.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub content: String,
    /// `true` when authored by the end user, `false` when by the agent.
    pub human: bool,
    pub created_at: DateTime<Utc>,
}
