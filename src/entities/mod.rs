//! Database abstraction layer.
//!
//! Each persistence concern gets a small trait ([`UserStore`],
//! [`SessionStore`], [`ConversationStore`], [`MessageStore`]) implemented on
//! [`SqliteStore`]. To swap SQLite for another database, implement the traits
//! for a new type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required. Queries use the
//! runtime-verified `sqlx::query` form so no `DATABASE_URL` is needed at
//! compile time; timestamps are stored as RFC 3339 text.

pub mod conversation;
pub mod dao;
pub mod message;
pub mod session;
pub mod user;

pub use dao::{Conversation, Message, Session, User};

pub use conversation::ConversationStore;
pub use message::MessageStore;
pub use session::SessionStore;
pub use user::UserStore;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// SQLite-backed store shared by every trait in this module.
///
/// # Migrations path
///
/// `sqlx::migrate!("./migrations")` resolves the path **at compile time**
/// relative to `CARGO_MANIFEST_DIR`, so the migration SQL is embedded into
/// the binary. The database file location is determined at runtime by
/// `INCONTEXT_DATABASE_URL` and is unrelated to the working directory.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending
    /// migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://incontext.db?mode=rwc"`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new().connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory database for tests. Pinned to a single connection so
    /// every query sees the migrated schema.
    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

/// Parse an RFC 3339 timestamp column, logging and substituting `now` on
/// corrupt data rather than failing the whole query.
fn parse_timestamp(raw: &str) -> chrono::DateTime<chrono::Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw = %raw, error = %e, "failed to parse stored timestamp; using now");
        chrono::Utc::now()
    })
}
