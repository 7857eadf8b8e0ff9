use std::future::Future;

use chrono::Utc;

use crate::entities::{SqliteStore, dao::Conversation, parse_timestamp};

const SELECT_JOINED: &str = "SELECT c.id, c.name, c.created_at, c.creator_id, u.username \
     FROM conversations c JOIN users u ON c.creator_id = u.id";

pub trait ConversationStore: Send + Sync + 'static {
    /// Every conversation joined with its creator's username, newest created
    /// first. Unbounded; the index is a shared listing with no pagination.
    fn list_conversations(&self)
    -> impl Future<Output = Result<Vec<Conversation>, sqlx::Error>> + Send;

    /// Insert a new conversation and return its generated id. Name validation
    /// happens in the handler, not here.
    fn create_conversation(
        &self,
        name: &str,
        creator_id: i64,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    fn get_conversation(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Conversation>, sqlx::Error>> + Send;

    /// Update the name in place; `created_at` is untouched.
    fn rename_conversation(
        &self,
        id: i64,
        name: &str,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Delete the conversation row only. The caller orchestrates the
    /// message cascade via [`crate::entities::MessageStore::delete_messages`].
    fn delete_conversation(&self, id: i64) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

impl ConversationStore for SqliteStore {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, sqlx::Error> {
        let rows: Vec<(i64, String, String, i64, String)> =
            sqlx::query_as(&format!("{SELECT_JOINED} ORDER BY c.created_at DESC, c.id DESC"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn create_conversation(&self, name: &str, creator_id: i64) -> Result<i64, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO conversations (name, created_at, creator_id) VALUES (?1, ?2, ?3)",
        )
        .bind(name)
        .bind(&created_at)
        .bind(creator_id)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, sqlx::Error> {
        let row: Option<(i64, String, String, i64, String)> =
            sqlx::query_as(&format!("{SELECT_JOINED} WHERE c.id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(from_row))
    }

    async fn rename_conversation(&self, id: i64, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE conversations SET name = ?1 WHERE id = ?2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_conversation(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM conversations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn from_row(
    (id, name, created_at, creator_id, username): (i64, String, String, i64, String),
) -> Conversation {
    Conversation {
        id,
        name,
        created_at: parse_timestamp(&created_at),
        creator_id,
        username,
    }
}
