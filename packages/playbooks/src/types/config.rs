//! Configuration types for the pipeline and the connection pool.

use std::time::Duration;

use super::playbook::DEFAULT_CONFIDENCE;

/// Dimensionality of `text-embedding-3-small`, and of the `playbooks.embedding` column.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Configuration for extraction, embedding and retrieval.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Text-generation model used for extraction.
    pub extraction_model: String,

    /// Embedding model. Vectors are only comparable within one model.
    pub embedding_model: String,

    /// Sampling temperature for extraction. Default: 0.3.
    pub temperature: f32,

    /// Expected embedding length. Vectors of any other length are rejected.
    pub embedding_dimensions: usize,

    /// Deadline for a single upstream model call. Default: 60s.
    pub model_timeout: Duration,

    /// Confidence stored on new playbooks. Default: 0.8.
    pub default_confidence: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction_model: "anthropic/claude-3.5-sonnet".to_string(),
            embedding_model: "openai/text-embedding-3-small".to_string(),
            temperature: 0.3,
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            model_timeout: Duration::from_secs(60),
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extraction model.
    pub fn with_extraction_model(mut self, model: impl Into<String>) -> Self {
        self.extraction_model = model.into();
        self
    }

    /// Set the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the expected embedding length.
    pub fn with_embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.embedding_dimensions = dimensions;
        self
    }

    /// Set the per-call model deadline.
    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }
}

/// Connection pool settings.
///
/// Extraction and embedding calls happen outside any transaction, so a small
/// pool is enough; the timeouts keep a wedged query from starving it.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Default: 5.
    pub max_connections: u32,

    /// Time to wait for a free connection. Default: 15s.
    pub acquire_timeout: Duration,

    /// Server-side `statement_timeout` set on every connection. Default: 15s.
    pub statement_timeout: Duration,

    /// Idle connections are closed after this long. Default: 30s.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(15),
            statement_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.embedding_dimensions, 1536);
        assert_eq!(config.default_confidence, 0.8);
    }

    #[test]
    fn test_pool_defaults() {
        let pool = PoolConfig::default();
        assert_eq!(pool.max_connections, 5);
        assert_eq!(pool.acquire_timeout, Duration::from_secs(15));
        assert_eq!(pool.statement_timeout, Duration::from_secs(15));
        assert_eq!(pool.idle_timeout, Duration::from_secs(30));
    }
}
