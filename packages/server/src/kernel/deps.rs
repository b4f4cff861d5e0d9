//! Server dependencies (using traits for testability)
//!
//! The composition root: one store, one AI and one pipeline config, built
//! once at startup and shared by every route and CLI command.

use anyhow::{Context, Result};
use openai_client::OpenAIClient;
use playbooks::ai::OpenAI;
use playbooks::{Orchestrator, PipelineConfig, PostgresStore, Retriever, Store, AI};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;

/// Attribution headers OpenRouter shows in its dashboard.
const OPENROUTER_REFERER: &str = "https://synapes.app";
const OPENROUTER_TITLE: &str = "Synapes Playbook Extractor";

pub type AppOrchestrator = Orchestrator<Arc<dyn Store>, Arc<dyn AI>>;
pub type AppRetriever = Retriever<Arc<dyn Store>, Arc<dyn AI>>;

/// Shared dependencies.
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn Store>,
    pub ai: Arc<dyn AI>,
    /// Present when backed by Postgres; powers health and database stats.
    pub postgres: Option<PostgresStore>,
    pub pipeline: PipelineConfig,
    pub sample_docs_dir: PathBuf,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn Store>,
        ai: Arc<dyn AI>,
        pipeline: PipelineConfig,
        sample_docs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            ai,
            postgres: None,
            pipeline,
            sample_docs_dir: sample_docs_dir.into(),
        }
    }

    /// Postgres-backed deps with the OpenAI-compatible model client.
    pub fn with_postgres(store: PostgresStore, ai: Arc<dyn AI>, config: &Config) -> Self {
        Self {
            store: Arc::new(store.clone()),
            ai,
            postgres: Some(store),
            pipeline: config.pipeline(),
            sample_docs_dir: config.sample_docs_dir.clone(),
        }
    }

    /// Connect to Postgres, run migrations and wire up the model client.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = PostgresStore::connect(&config.database_url, &config.pool())
            .await
            .context("Failed to connect to database")?;
        store.migrate().await.context("Failed to run migrations")?;

        let ai: Arc<dyn AI> = Arc::new(build_openai(config));
        Ok(Self::with_postgres(store, ai, config))
    }

    pub fn orchestrator(&self) -> AppOrchestrator {
        Orchestrator::new(self.store.clone(), self.ai.clone()).with_config(self.pipeline.clone())
    }

    pub fn retriever(&self) -> AppRetriever {
        Retriever::new(self.store.clone(), self.ai.clone()).with_config(self.pipeline.clone())
    }
}

/// OpenRouter (or any OpenAI-compatible endpoint) client for extraction and embeddings.
pub fn build_openai(config: &Config) -> OpenAI {
    let client = OpenAIClient::new(&config.openai_api_key)
        .with_base_url(&config.openai_base_url)
        .with_timeout(config.model_timeout)
        .with_header("HTTP-Referer", OPENROUTER_REFERER)
        .with_header("X-Title", OPENROUTER_TITLE);
    OpenAI::new(client, &config.pipeline())
}
