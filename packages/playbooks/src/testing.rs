//! Testing utilities including mock implementations.
//!
//! `MockAI` stands in for the model endpoints so the pipeline and retrieval
//! can be exercised without network calls. Pair it with
//! [`MemoryStore`](crate::stores::MemoryStore).

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{PlaybookError, Result};
use crate::traits::ai::AI;
use crate::types::config::DEFAULT_EMBEDDING_DIMENSIONS;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// A mock AI implementation for testing.
///
/// Completions are keyed by a marker: the first registered marker found in
/// the prompt decides the reply. Embeddings default to a bag-of-words hash
/// of the text, so texts sharing words get similar vectors.
pub struct MockAI {
    /// Completion replies by prompt marker, in registration order
    completions: Arc<RwLock<Vec<(String, Reply)>>>,

    /// Embedding overrides by text marker
    embeddings: Arc<RwLock<Vec<(String, Reply)>>>,

    /// Exact embeddings by text
    fixed_embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Default embedding dimension
    embedding_dim: usize,

    /// Artificial latency applied to every call
    delay: Option<Duration>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAICall>>>,
}

/// Record of a call made to the mock AI.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAICall {
    CompleteJson { prompt_len: usize },
    Embed { text: String },
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAI {
    /// Create a new mock AI with default behavior.
    pub fn new() -> Self {
        Self {
            completions: Arc::default(),
            embeddings: Arc::default(),
            fixed_embeddings: Arc::default(),
            embedding_dim: DEFAULT_EMBEDDING_DIMENSIONS,
            delay: None,
            calls: Arc::default(),
        }
    }

    /// Set the embedding dimension.
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer prompts containing `marker` with `response`.
    pub fn with_completion(self, marker: impl Into<String>, response: impl Into<String>) -> Self {
        self.completions
            .write()
            .unwrap()
            .push((marker.into(), Reply::Text(response.into())));
        self
    }

    /// Fail prompts containing `marker` as an unreachable model would.
    pub fn with_completion_failure(
        self,
        marker: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.completions
            .write()
            .unwrap()
            .push((marker.into(), Reply::Fail(message.into())));
        self
    }

    /// Return `embedding` for exactly `text`.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.fixed_embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Fail embedding calls whose text contains `marker`.
    pub fn with_embedding_failure(self, marker: impl Into<String>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .push((marker.into(), Reply::Fail("embedding endpoint unavailable".into())));
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAICall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of completion calls made.
    pub fn completion_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAICall::CompleteJson { .. }))
            .count()
    }

    /// Number of embedding calls made.
    pub fn embed_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAICall::Embed { .. }))
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Deterministic bag-of-words embedding: each lowercase word bumps one
    /// hashed dimension.
    pub fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.embedding_dim];
        if self.embedding_dim == 0 {
            return embedding;
        }
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() % self.embedding_dim as u64) as usize;
            embedding[idx] += 1.0;
        }
        embedding
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn find_reply(replies: &RwLock<Vec<(String, Reply)>>, text: &str) -> Option<Reply> {
    replies
        .read()
        .unwrap()
        .iter()
        .find(|(marker, _)| text.contains(marker.as_str()))
        .map(|(_, reply)| reply.clone())
}

#[async_trait]
impl AI for MockAI {
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        self.calls.write().unwrap().push(MockAICall::CompleteJson {
            prompt_len: prompt.len(),
        });
        self.pause().await;

        match find_reply(&self.completions, prompt) {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(PlaybookError::UpstreamModel(message)),
            None => Err(PlaybookError::UpstreamModel(
                "no mock completion registered for prompt".into(),
            )),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.write().unwrap().push(MockAICall::Embed {
            text: text.to_string(),
        });
        self.pause().await;

        if let Some(Reply::Fail(message)) = find_reply(&self.embeddings, text) {
            return Err(PlaybookError::UpstreamModel(message));
        }
        if let Some(embedding) = self.fixed_embeddings.read().unwrap().get(text) {
            return Ok(embedding.clone());
        }
        Ok(self.deterministic_embedding(text))
    }
}
