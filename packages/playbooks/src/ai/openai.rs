//! OpenAI-compatible implementation of the AI trait.
//!
//! Talks to any OpenAI-shaped endpoint through [`OpenAIClient`]; by default
//! OpenRouter, which routes `anthropic/claude-3.5-sonnet` for extraction and
//! `openai/text-embedding-3-small` for embeddings.
//!
//! # Example
//!
//! ```rust,ignore
//! use playbooks::ai::{OpenAI, OPENROUTER_BASE_URL};
//!
//! let client = OpenAIClient::new("sk-or-...").with_base_url(OPENROUTER_BASE_URL);
//! let ai = OpenAI::new(client, &PipelineConfig::default());
//! let orchestrator = Orchestrator::new(store, ai);
//! ```

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use tracing::debug;

use crate::error::Result;
use crate::traits::ai::AI;
use crate::types::config::PipelineConfig;

/// OpenRouter's OpenAI-compatible API root.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// AI backed by an OpenAI-compatible REST API.
#[derive(Clone)]
pub struct OpenAI {
    client: OpenAIClient,
    model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAI {
    /// Use `client` with the models and temperature from `config`.
    pub fn new(client: OpenAIClient, config: &PipelineConfig) -> Self {
        Self {
            client,
            model: config.extraction_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        }
    }

    /// Get the extraction model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the embedding model name.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl AI for OpenAI {
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .message(Message::user(prompt))
            .temperature(self.temperature)
            .json_mode();

        let response = self.client.chat_completion(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Extraction tokens"
            );
        }
        Ok(response.content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .client
            .create_embedding(text, &self.embedding_model)
            .await?)
    }
}
