//! AI trait for model endpoints.
//!
//! Infrastructure only: the trait sends text and returns raw text or vectors.
//! What to prompt for and how to validate the answer lives in `pipeline`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

/// Text-generation and embedding capabilities.
///
/// Implementations must report transport, auth and rate-limit failures as
/// `PlaybookError::UpstreamModel`. They never retry.
#[async_trait]
pub trait AI: Send + Sync {
    /// Complete a prompt in strict JSON mode and return the raw response body.
    async fn complete_json(&self, prompt: &str) -> Result<String>;

    /// Generate an embedding for text.
    ///
    /// Returns a vector whose length is fixed by the embedding model
    /// (1536 for text-embedding-3-small). No normalization is applied.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
impl<T: AI + ?Sized> AI for Arc<T> {
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        (**self).complete_json(prompt).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text).await
    }
}
