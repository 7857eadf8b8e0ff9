//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for incontext.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set (the agent endpoint still needs a
/// credential, see [`crate::agent::credentials`]).
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://incontext.db?mode=rwc"`).
    /// Any sqlx-compatible SQLite connection string works, including
    /// `"sqlite::memory:"` for throwaway instances.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Chat-completion endpoint the agent gateway posts to.
    pub agent_url: String,

    /// Model identifier sent with every completion request.
    pub agent_model: String,

    /// Directory holding secret files; used as the fallback credential
    /// source when `OPENAI_API_KEY` is not in the environment.
    pub secrets_dir: Option<String>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("INCONTEXT_BIND", "0.0.0.0:8000"),
            database_url: env_or("INCONTEXT_DATABASE_URL", "sqlite://incontext.db?mode=rwc"),
            log_level: env_or("INCONTEXT_LOG", "info"),
            log_json: std::env::var("INCONTEXT_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: std::env::var("INCONTEXT_CORS_ORIGINS").ok(),
            agent_url: env_or(
                "INCONTEXT_AGENT_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            agent_model: env_or("INCONTEXT_AGENT_MODEL", "gpt-4.1-mini"),
            secrets_dir: std::env::var("INCONTEXT_SECRETS_DIR").ok(),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
