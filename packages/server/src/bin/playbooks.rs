//! Operator CLI for the playbook pipeline.
//!
//! Every command prints a single JSON document on stdout so it can be piped
//! into `jq`. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playbook_server::kernel::{init_tracing, ServerDeps};
use playbook_server::Config;
use playbooks::pipeline::seed_directory;
use playbooks::{
    AnalyticsStore, DocumentId, PostgresStore, SearchMode, SearchRequest, SearchResult,
    SearchType,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "playbooks")]
#[command(about = "Extract, search and inspect playbooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,

    /// Load every *.md file in a directory as a document
    Seed { dir: Option<PathBuf> },

    /// Extract playbooks from every document
    Extract,

    /// Extract playbooks from the given documents
    BulkExtract {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Search playbooks
    Search {
        query: String,
        #[arg(long, default_value = "hybrid")]
        mode: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Collection statistics
    Analytics,
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    mode: SearchMode,
    count: usize,
    results: Vec<SearchRow>,
}

#[derive(Serialize)]
struct SearchRow {
    id: i64,
    task_name: String,
    score: i64,
    search_types: Vec<SearchType>,
}

impl From<SearchResult> for SearchRow {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.playbook.id.get(),
            score: result.score_percent(),
            task_name: result.playbook.task_name,
            search_types: result.search_types,
        }
    }
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Migrate => cmd_migrate(&config).await,
        Commands::Seed { dir } => cmd_seed(&config, dir).await,
        Commands::Extract => cmd_extract(&config).await,
        Commands::BulkExtract { ids } => cmd_bulk_extract(&config, ids).await,
        Commands::Search { query, mode, limit } => cmd_search(&config, query, &mode, limit).await,
        Commands::Analytics => cmd_analytics(&config).await,
    }
}

async fn cmd_migrate(config: &Config) -> Result<()> {
    let store = PostgresStore::connect(&config.database_url, &config.pool())
        .await
        .context("Failed to connect to database")?;
    store.migrate().await.context("Failed to run migrations")?;
    output(&serde_json::json!({ "success": true, "message": "Migrations complete" }))
}

async fn cmd_seed(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    let deps = ServerDeps::from_config(config).await?;
    let dir = dir.unwrap_or_else(|| deps.sample_docs_dir.clone());
    let documents = seed_directory(deps.store.as_ref(), &dir)
        .await
        .with_context(|| format!("Failed to seed from {}", dir.display()))?;

    let sources: Vec<&str> = documents.iter().map(|d| d.source.as_str()).collect();
    output(&serde_json::json!({
        "success": true,
        "message": format!("Seeded {} documents", documents.len()),
        "documents": sources,
    }))
}

async fn cmd_extract(config: &Config) -> Result<()> {
    let deps = ServerDeps::from_config(config).await?;
    let report = deps
        .orchestrator()
        .extract_all()
        .await
        .context("Extraction failed")?;
    output(&report)
}

async fn cmd_bulk_extract(config: &Config, ids: Vec<i64>) -> Result<()> {
    let deps = ServerDeps::from_config(config).await?;
    let ids: Vec<DocumentId> = ids.into_iter().map(DocumentId).collect();
    let report = deps
        .orchestrator()
        .extract_documents(&ids)
        .await
        .context("Bulk extraction failed")?;
    output(&report)
}

async fn cmd_search(config: &Config, query: String, mode: &str, limit: usize) -> Result<()> {
    let mode: SearchMode = mode.parse()?;
    let deps = ServerDeps::from_config(config).await?;
    let results = deps
        .retriever()
        .search(&SearchRequest::new(&query, mode).with_limit(limit))
        .await
        .context("Search failed")?;

    let results: Vec<SearchRow> = results.into_iter().map(Into::into).collect();
    output(&SearchOutput {
        query,
        mode,
        count: results.len(),
        results,
    })
}

async fn cmd_analytics(config: &Config) -> Result<()> {
    let deps = ServerDeps::from_config(config).await?;
    let analytics = deps
        .store
        .analytics()
        .await
        .context("Failed to fetch analytics")?;
    output(&analytics)
}
