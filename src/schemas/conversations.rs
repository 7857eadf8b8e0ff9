use serde::{Deserialize, Serialize};

use crate::entities::dao::Conversation;
use crate::schemas::messages::MessageResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameConversationRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub creator_id: i64,
    /// Username of the creator.
    pub username: String,
}

/// A conversation together with its full message history, ascending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDetailResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub messages: Vec<MessageResponse>,
}

impl Conversation {
    pub fn to_response(&self) -> ConversationResponse {
        ConversationResponse {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at.to_rfc3339(),
            creator_id: self.creator_id,
            username: self.username.clone(),
        }
    }
}
