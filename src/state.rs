//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::agent::OpenAiGateway;
use crate::config::Config;
use crate::entities::SqliteStore;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persistent user / session / conversation / message store.
    pub store: Arc<SqliteStore>,
    /// Gateway to the external chat-completion API.
    pub gateway: Arc<OpenAiGateway>,
}
