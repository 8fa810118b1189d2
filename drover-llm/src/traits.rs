use async_trait::async_trait;
use drover_common::Result;
use serde::{Deserialize, Serialize};

/// One turn of a chat conversation, in the shape both Ollama and
/// OpenAI-compatible chat endpoints accept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<LlmError> for drover_common::DroverError {
    fn from(e: LlmError) -> Self {
        drover_common::DroverError::Llm(e.to_string())
    }
}

/// Provider-agnostic chat interface.
///
/// Implementations take the full conversation history each call; they keep
/// no conversational state of their own.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the conversation and return the assistant's next message.
    async fn respond(&self, history: &[ChatMessage]) -> Result<String>;

    /// Check if the provider is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let msg = ChatMessage::user("open example.com");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "open example.com");
    }

    #[test]
    fn llm_errors_fold_into_the_shared_error_type() {
        let err: drover_common::DroverError = LlmError::Api("HTTP 500".into()).into();
        assert!(err.to_string().contains("HTTP 500"));
    }
}
