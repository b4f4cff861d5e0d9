//! Pure OpenAI REST API client
//!
//! A clean, minimal client for OpenAI-compatible APIs (OpenAI itself, OpenRouter,
//! Azure proxies) with no domain-specific logic. Supports chat completions,
//! JSON-mode output and embeddings.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message};
//!
//! let client = OpenAIClient::from_env()?
//!     .with_base_url("https://openrouter.ai/api/v1")
//!     .with_timeout(Duration::from_secs(60));
//!
//! // JSON-mode chat completion
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new("anthropic/claude-3.5-sonnet")
//!             .message(Message::user("Return {\"ok\": true}"))
//!             .temperature(0.3)
//!             .json_mode(),
//!     )
//!     .await?;
//!
//! // Embeddings
//! let embedding = client.create_embedding("text to embed", "text-embedding-3-small").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, warn};

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for OpenRouter, Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the deadline applied to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header sent with every request (e.g. OpenRouter's `X-Title`).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Get the per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> RequestBuilder {
        let mut request = self
            .http_client
            .post(format!("{}/{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout);

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        request.json(body)
    }

    /// Turn a non-2xx response into `OpenAIError::Api`, preferring the API's own message.
    async fn check_status(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<types::ApiErrorBody>(&error_text)
            .map(|body| body.error.message)
            .unwrap_or(error_text);

        warn!(status = %status, error = %message, "{} failed", context);
        Err(OpenAIError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get a response.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .post("chat/completions", &request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, model = %request.model, "OpenAI request failed");
                OpenAIError::from(e)
            })?;

        let response = Self::check_status(response, "OpenAI chat completion").await?;

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenAIError::EmptyResponse("no content in completion".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            response_length = content.len(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }

    /// Create embedding for text.
    ///
    /// Returns a vector (1536 dimensions for text-embedding-3-small).
    pub async fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let request = types::EmbeddingRequest {
            model: model.to_string(),
            input: text.to_string(),
        };

        let response = self
            .post("embeddings", &request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, model = %model, "Embedding request failed");
                OpenAIError::from(e)
            })?;

        let response = Self::check_status(response, "OpenAI embedding").await?;

        let embed_response: types::EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| OpenAIError::EmptyResponse("no embedding data".into()))
    }
}
