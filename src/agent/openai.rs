//! OpenAI-compatible chat-completion gateway.
//!
//! Stateless across calls: all conversational state is the message history
//! the caller loads from the store. One synchronous (from the request's point
//! of view) POST per invocation; no retries, no timeout override beyond the
//! HTTP client's default.

use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::credentials::CredentialResolver;
use super::AgentError;
use crate::config::Config;
use crate::entities::dao::Message;

static SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// A single turn in the request payload.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    /// `"system"`, `"user"`, or `"assistant"`.
    pub role: &'static str,
    pub content: String,
}

#[derive(Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Gateway to an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiGateway {
    client: Client,
    url: String,
    model: String,
    resolver: Arc<dyn CredentialResolver>,
}

impl OpenAiGateway {
    pub fn new(config: &Config, resolver: Arc<dyn CredentialResolver>) -> Self {
        Self {
            client: Client::new(),
            url: config.agent_url.clone(),
            model: config.agent_model.clone(),
            resolver,
        }
    }

    /// Ask the external API for the next assistant turn given `history`.
    ///
    /// Returns the assistant text on success. Every failure mode — missing
    /// credential, transport error, non-2xx status, unusable body — comes
    /// back as an [`AgentError`]; the caller decides how to surface it and
    /// whether to persist anything.
    pub async fn complete(&self, history: &[Message]) -> Result<String, AgentError> {
        let key = self.resolver.resolve()?;
        let turns = build_turns(history);
        debug!(model = %self.model, turns = turns.len(), "sending completion request");

        let payload = ChatPayload {
            model: &self.model,
            messages: &turns,
        };
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AgentError::Malformed("response contained no choices".into()))
    }
}

/// Map stored history onto API roles: a fixed system instruction first, then
/// `human == true` → `"user"` and `human == false` → `"assistant"`, order and
/// content verbatim.
pub fn build_turns(history: &[Message]) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(history.len() + 1);
    turns.push(ChatTurn {
        role: "system",
        content: SYSTEM_PROMPT.to_owned(),
    });
    for message in history {
        turns.push(ChatTurn {
            role: if message.human { "user" } else { "assistant" },
            content: message.content.clone(),
        });
    }
    turns
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;

    fn message(id: i64, content: &str, human: bool) -> Message {
        Message {
            id,
            conversation_id: 1,
            content: content.into(),
            human,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn history_maps_to_system_user_assistant() {
        let history = vec![message(1, "hi", true), message(2, "hello", false)];
        let turns = build_turns(&history);

        let roles: Vec<&str> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
        assert_eq!(turns[0].content, "You are a helpful assistant.");
        assert_eq!(turns[1].content, "hi");
        assert_eq!(turns[2].content, "hello");
    }

    #[test]
    fn empty_history_still_carries_the_system_turn() {
        let turns = build_turns(&[]);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, "system");
    }

    #[test]
    fn payload_serializes_in_openai_shape() {
        let turns = build_turns(&[message(1, "hi", true)]);
        let payload = ChatPayload {
            model: "gpt-4.1-mini",
            messages: &turns,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "gpt-4.1-mini");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hi");
    }
}
