use crate::traits::{ChatMessage, LlmClient, LlmError};
use async_trait::async_trait;
use drover_common::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaClient {
    /// Create a new client and verify the server is reachable.
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let ollama_client = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        };

        ollama_client.probe_server().await?;

        Ok(ollama_client)
    }

    async fn probe_server(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| LlmError::Config(OLLAMA_CONNECTION_ERROR.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(LlmError::Config(OLLAMA_CONNECTION_ERROR.to_string()).into())
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let payload = ChatRequest {
            model: &self.model,
            messages: history,
            stream: false,
        };

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Api(format!("Chat request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("Chat failed: HTTP {}", resp.status())).into());
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Api(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.message.content)
    }

    async fn health_check(&self) -> Result<bool> {
        self.probe_server().await.map(|_| true).or(Ok(false))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
