//! Provider-agnostic LLM integration for Drover.
//!
//! This crate exposes a common [`traits::LlmClient`] chat interface and
//! concrete provider implementations for Ollama and OpenAI-compatible
//! servers, plus a convenience function to initialize a client from a
//! [`drover_config::LlmConfig`].
pub mod ollama;
pub mod openai_compat;
pub mod traits;

use drover_config::LlmConfig;
use ollama::OllamaClient;
use openai_compat::OpenAiCompatClient;
use std::sync::Arc;
use traits::LlmClient;

/// Build and verify an LLM client from the loaded configuration.
pub async fn ensure_llm_ready(
    config: &LlmConfig,
) -> drover_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::Ollama { model, endpoint } => {
            let client = OllamaClient::new(endpoint.clone(), model.clone()).await?;
            Ok(Arc::new(client))
        }
        LlmConfig::Openai {
            model,
            auth_token,
            endpoint,
            temperature,
            max_tokens,
        } => {
            let client = OpenAiCompatClient::new(
                endpoint.clone(),
                auth_token.clone(),
                model.clone(),
                *temperature,
                *max_tokens,
            )?;
            Ok(Arc::new(client))
        }
    }
}
