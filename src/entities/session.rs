use std::future::Future;

use chrono::Utc;

use crate::entities::{SqliteStore, dao::Session, parse_timestamp};

pub trait SessionStore: Send + Sync + 'static {
    fn create_session(
        &self,
        token: &str,
        user_id: i64,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    fn find_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Session>, sqlx::Error>> + Send;

    /// Idempotent: deleting an unknown token is not an error.
    fn delete_session(&self, token: &str)
    -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

impl SessionStore for SqliteStore {
    async fn create_session(&self, token: &str, user_id: i64) -> Result<(), sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(token)
            .bind(user_id)
            .bind(&created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, sqlx::Error> {
        let row: Option<(String, i64, String)> =
            sqlx::query_as("SELECT token, user_id, created_at FROM sessions WHERE token = ?1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(token, user_id, created_at)| Session {
            token,
            user_id,
            created_at: parse_timestamp(&created_at),
        }))
    }

    async fn delete_session(&self, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::UserStore;

    #[tokio::test]
    async fn session_lifecycle() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        let user_id = store.create_user("alice", "h").await.unwrap();

        store.create_session("tok-1", user_id).await.unwrap();
        let session = store.find_session("tok-1").await.unwrap().unwrap();
        assert_eq!(session.user_id, user_id);

        store.delete_session("tok-1").await.unwrap();
        assert!(store.find_session("tok-1").await.unwrap().is_none());

        // deleting again is a no-op
        store.delete_session("tok-1").await.unwrap();
    }
}
