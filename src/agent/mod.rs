//! Agent gateway: turns a conversation's stored history into one external
//! chat-completion call and normalizes the outcome into a typed result.
//!
//! Failures never cross into the request handler as panics or raw errors;
//! the handler converts [`AgentError`] into a soft, non-5xx reply.

pub mod credentials;
pub mod openai;

pub use credentials::{API_KEY_VAR, CredentialResolver, EnvFileResolver};
pub use openai::OpenAiGateway;

use thiserror::Error;

/// Everything that can go wrong between "user asked for a reply" and
/// "assistant text in hand".
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key in the environment or the secrets directory.
    #[error("missing API credential: {0}")]
    Credential(String),

    /// Transport or non-2xx status from the completion endpoint.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The endpoint answered 2xx but the body was not a usable completion.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}
