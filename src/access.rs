//! Conversation ownership guard.
//!
//! This is the sole access-control authority: handlers run it against the
//! conversation row before any mutation and before any read that exposes a
//! conversation's contents. The message store never re-checks ownership.
//! The conversation index is intentionally exempt — it is a shared listing
//! visible to every authenticated user.

use crate::entities::dao::Conversation;
use crate::error::ServerError;
use crate::middleware::auth::CurrentUser;

pub fn is_owner(creator_id: i64, user_id: i64) -> bool {
    creator_id == user_id
}

/// Fail with `Forbidden` unless `user` created `conversation`.
pub fn ensure_owner(conversation: &Conversation, user: &CurrentUser) -> Result<(), ServerError> {
    if is_owner(conversation.creator_id, user.id) {
        Ok(())
    } else {
        Err(ServerError::Forbidden)
    }
}
