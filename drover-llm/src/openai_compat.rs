use crate::traits::{ChatMessage, LlmClient, LlmError};
use async_trait::async_trait;
use drover_common::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for OpenAI's chat-completions API and compatible servers.
///
/// LM Studio, DeepSeek, and most self-hosted inference servers expose the
/// same wire format; only the base URL and token differ.
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenAiCompatClient {
    pub fn new(
        base_url: String,
        auth_token: String,
        model: String,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            model,
            temperature,
            max_tokens,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let req = ChatCompletionRequest {
            model: &self.model,
            messages: history,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.auth_token)
            .json(&req)
            .send()
            .await
            .map_err(|e| LlmError::Api(format!("Chat request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("Chat failed: HTTP {}", resp.status())).into());
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Api(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Api("Response contained no choices".to_string()).into())
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = [ChatMessage::user("Respond with just 'OK'")];

        match self.respond(&probe).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAI-compatible health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
