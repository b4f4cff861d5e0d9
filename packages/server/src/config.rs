use anyhow::{Context, Result};
use dotenvy::dotenv;
use playbooks::{ai::OPENROUTER_BASE_URL, PipelineConfig, PoolConfig};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub extraction_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub model_timeout: Duration,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_statement_timeout: Duration,
    pub db_idle_timeout: Duration,
    pub sample_docs_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let pipeline = PipelineConfig::default();
        let pool = PoolConfig::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 3000)?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| OPENROUTER_BASE_URL.to_string()),
            extraction_model: env::var("EXTRACTION_MODEL").unwrap_or(pipeline.extraction_model),
            embedding_model: env::var("EMBEDDING_MODEL").unwrap_or(pipeline.embedding_model),
            embedding_dimensions: parse_or("EMBEDDING_DIMENSIONS", pipeline.embedding_dimensions)?,
            model_timeout: secs_or("MODEL_TIMEOUT_SECS", pipeline.model_timeout)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", pool.max_connections)?,
            db_acquire_timeout: secs_or("DB_ACQUIRE_TIMEOUT_SECS", pool.acquire_timeout)?,
            db_statement_timeout: secs_or("DB_STATEMENT_TIMEOUT_SECS", pool.statement_timeout)?,
            db_idle_timeout: secs_or("DB_IDLE_TIMEOUT_SECS", pool.idle_timeout)?,
            sample_docs_dir: env::var("SAMPLE_DOCS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("sample-docs")),
        })
    }

    /// Pipeline settings (models, embedding size, model deadline).
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_extraction_model(&self.extraction_model)
            .with_embedding_model(&self.embedding_model)
            .with_embedding_dimensions(self.embedding_dimensions)
            .with_model_timeout(self.model_timeout)
    }

    /// Connection pool settings.
    pub fn pool(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.db_max_connections,
            acquire_timeout: self.db_acquire_timeout,
            statement_timeout: self.db_statement_timeout,
            idle_timeout: self.db_idle_timeout,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn secs_or(key: &str, default: Duration) -> Result<Duration> {
    parse_or(key, default.as_secs()).map(Duration::from_secs)
}
