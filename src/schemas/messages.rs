use serde::{Deserialize, Serialize};

use crate::entities::dao::Message;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub conversation_id: i64,
    pub content: String,
    /// `true` for user-authored turns, `false` for agent turns.
    pub human: bool,
    pub created_at: String,
}

/// Body of a successful `POST .../agent-response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReplyResponse {
    pub content: String,
}

impl Message {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id,
            conversation_id: self.conversation_id,
            content: self.content.clone(),
            human: self.human,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
