use std::future::Future;

use chrono::Utc;

use crate::entities::{SqliteStore, dao::Message, parse_timestamp};

/// Message persistence, scoped to a conversation.
///
/// This store trusts its caller on ownership: the conversation-level guard
/// in the handlers is the sole access-control authority, so an empty
/// conversation is protected exactly like a non-empty one.
pub trait MessageStore: Send + Sync + 'static {
    /// Messages for a conversation in insertion (id) order, ascending.
    fn list_messages(
        &self,
        conversation_id: i64,
    ) -> impl Future<Output = Result<Vec<Message>, sqlx::Error>> + Send;

    /// Insert a message and return its generated id. Content validation
    /// happens in the handler, not here.
    fn append_message(
        &self,
        conversation_id: i64,
        content: &str,
        human: bool,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Delete every message of a conversation. Idempotent.
    fn delete_messages(
        &self,
        conversation_id: i64,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

impl MessageStore for SqliteStore {
    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, sqlx::Error> {
        let rows: Vec<(i64, i64, String, i64, String)> = sqlx::query_as(
            "SELECT id, conversation_id, content, human, created_at \
             FROM messages WHERE conversation_id = ?1 ORDER BY id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, conversation_id, content, human, created_at)| Message {
                id,
                conversation_id,
                content,
                human: human != 0,
                created_at: parse_timestamp(&created_at),
            })
            .collect())
    }

    async fn append_message(
        &self,
        conversation_id: i64,
        content: &str,
        human: bool,
    ) -> Result<i64, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, content, human, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(conversation_id)
        .bind(content)
        .bind(human as i64)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn delete_messages(&self, conversation_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM messages WHERE conversation_id = ?1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::{ConversationStore, UserStore};

    async fn store_with_conversation() -> (SqliteStore, i64) {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        let user_id = store.create_user("alice", "h").await.unwrap();
        let conversation_id = store.create_conversation("demo", user_id).await.unwrap();
        (store, conversation_id)
    }

    #[tokio::test]
    async fn round_trip_preserves_flag_content_and_order() {
        let (store, cid) = store_with_conversation().await;
        store.append_message(cid, "hi", true).await.unwrap();
        store.append_message(cid, "hello", false).await.unwrap();

        let messages = store.list_messages(cid).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert!(messages[0].human);
        assert_eq!(messages[1].content, "hello");
        assert!(!messages[1].human);
    }

    #[tokio::test]
    async fn delete_messages_is_idempotent() {
        let (store, cid) = store_with_conversation().await;
        store.append_message(cid, "hi", true).await.unwrap();

        store.delete_messages(cid).await.unwrap();
        assert!(store.list_messages(cid).await.unwrap().is_empty());

        store.delete_messages(cid).await.unwrap();
        assert!(store.list_messages(cid).await.unwrap().is_empty());
    }
}
