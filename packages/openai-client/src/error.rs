//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, deadline exceeded)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, auth failure)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (response body is not the expected JSON envelope)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The API answered successfully but carried no usable payload
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl OpenAIError {
    /// Whether the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        matches!(self, OpenAIError::Network(msg) if msg.contains("timed out"))
    }

    /// Whether the API rejected the request for rate limiting (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, OpenAIError::Api { status: 429, .. })
    }
}

impl From<reqwest::Error> for OpenAIError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OpenAIError::Network(format!("request timed out: {}", e))
        } else {
            OpenAIError::Network(e.to_string())
        }
    }
}
