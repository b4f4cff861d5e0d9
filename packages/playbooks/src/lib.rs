//! Playbook extraction and retrieval.
//!
//! Turns free-text operational documents into structured playbooks (ordered
//! steps plus known failures), embeds each one, and searches the collection
//! four ways: fuzzy, full-text, semantic and hybrid.
//!
//! # Usage
//!
//! ```rust,ignore
//! use playbooks::{MemoryStore, Orchestrator, Retriever, SearchMode, SearchRequest};
//! use playbooks::testing::MockAI;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let ai = Arc::new(MockAI::new());
//!
//! // Write path
//! let orchestrator = Orchestrator::new(store.clone(), ai.clone());
//! let report = orchestrator.extract_all().await?;
//!
//! // Read path
//! let retriever = Retriever::new(store, ai);
//! let results = retriever
//!     .search(&SearchRequest::new("deploy", SearchMode::Hybrid))
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - `AI` and storage abstractions
//! - [`types`] - Documents, playbooks, feedback, search and report types
//! - [`pipeline`] - Extraction, embedding, orchestration and retrieval
//! - [`stores`] - `MemoryStore` and (with `postgres`) `PostgresStore`
//! - [`testing`] - Mock AI for tests
//!
//! # Features
//!
//! - `postgres`: sqlx + pgvector storage backend and embedded migrations
//! - `openai`: `ai::OpenAI`, an `AI` over any OpenAI-compatible endpoint

pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

pub use error::{PlaybookError, Result, Stage};
pub use pipeline::{DocumentFailure, Orchestrator, Retriever};
pub use stores::MemoryStore;
#[cfg(feature = "postgres")]
pub use stores::{DatabaseStats, PostgresStore};
pub use traits::{
    ai::AI,
    store::{AnalyticsStore, DocumentStore, FeedbackStore, PlaybookStore, Store},
};
pub use types::{
    analytics::Analytics,
    config::{PipelineConfig, PoolConfig},
    document::{Document, NewDocument},
    feedback::{Feedback, NewFeedback},
    id::{DocumentId, FeedbackId, PlaybookId},
    playbook::{CommonFailure, ExtractedPlaybook, NewPlaybook, Playbook, PlaybookStep, PlaybookView},
    report::{BulkExtractionReport, ExtractionReport, PipelineStatus},
    search::{SearchMode, SearchRequest, SearchResult, SearchType},
};
