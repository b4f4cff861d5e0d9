//! Storage traits for documents, playbooks, feedback and analytics.
//!
//! The storage layer is split into focused traits:
//! - `DocumentStore`: read-only extraction input (plus seeding)
//! - `PlaybookStore`: atomic inserts, hydration and the three scoring modalities
//! - `FeedbackStore`: append-only user feedback
//! - `AnalyticsStore`: collection statistics
//! - `Store`: composite trait combining all four

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{
    analytics::Analytics,
    document::{Document, NewDocument},
    feedback::{Feedback, NewFeedback},
    id::{DocumentId, PlaybookId},
    playbook::{NewPlaybook, Playbook, PlaybookView},
    search::ScoredPlaybook,
};

/// Source documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in id order.
    async fn list_documents(&self) -> Result<Vec<Document>>;

    /// Documents whose id is in `ids`, in id order. Unknown ids are skipped.
    async fn get_documents(&self, ids: &[DocumentId]) -> Result<Vec<Document>>;

    /// Insert a document.
    async fn insert_document(&self, document: &NewDocument) -> Result<Document>;

    /// Count documents.
    async fn count_documents(&self) -> Result<i64>;
}

/// Extracted playbooks.
#[async_trait]
pub trait PlaybookStore: Send + Sync {
    /// Insert a complete playbook in a single statement.
    ///
    /// Either the full row (task name, steps, failures, embedding) becomes
    /// visible or nothing does.
    async fn insert_playbook(&self, playbook: &NewPlaybook) -> Result<Playbook>;

    /// Get a playbook by id.
    async fn get_playbook(&self, id: PlaybookId) -> Result<Option<PlaybookView>>;

    /// Hydrate a set of ids. Order of the result is unspecified.
    async fn get_playbooks(&self, ids: &[PlaybookId]) -> Result<Vec<PlaybookView>>;

    /// Page through playbooks, newest first.
    async fn list_playbooks(&self, limit: i64, offset: i64) -> Result<Vec<PlaybookView>>;

    /// Count playbooks.
    async fn count_playbooks(&self) -> Result<i64>;

    /// Trigram similarity on the task name; score in [0,1], best first.
    async fn search_fuzzy(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>>;

    /// Ranked full-text search; score is the engine rank, best first.
    async fn search_fulltext(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>>;

    /// Nearest neighbours by cosine distance; score = 1 - distance.
    /// Playbooks without an embedding are never returned.
    async fn search_semantic(&self, embedding: &[f32], limit: usize)
        -> Result<Vec<ScoredPlaybook>>;
}

/// User feedback.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Append a feedback entry.
    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<Feedback>;

    /// Feedback for one playbook, newest first.
    async fn list_feedback_for(&self, playbook_id: PlaybookId) -> Result<Vec<Feedback>>;
}

/// Collection statistics.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn analytics(&self) -> Result<Analytics>;
}

/// Composite storage trait combining all stores.
///
/// This is the trait used by the `Orchestrator` and `Retriever`.
pub trait Store: DocumentStore + PlaybookStore + FeedbackStore + AnalyticsStore {}

// Blanket implementation: anything implementing all four traits is a Store
impl<T: DocumentStore + PlaybookStore + FeedbackStore + AnalyticsStore> Store for T {}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        (**self).list_documents().await
    }

    async fn get_documents(&self, ids: &[DocumentId]) -> Result<Vec<Document>> {
        (**self).get_documents(ids).await
    }

    async fn insert_document(&self, document: &NewDocument) -> Result<Document> {
        (**self).insert_document(document).await
    }

    async fn count_documents(&self) -> Result<i64> {
        (**self).count_documents().await
    }
}

#[async_trait]
impl<T: PlaybookStore + ?Sized> PlaybookStore for Arc<T> {
    async fn insert_playbook(&self, playbook: &NewPlaybook) -> Result<Playbook> {
        (**self).insert_playbook(playbook).await
    }

    async fn get_playbook(&self, id: PlaybookId) -> Result<Option<PlaybookView>> {
        (**self).get_playbook(id).await
    }

    async fn get_playbooks(&self, ids: &[PlaybookId]) -> Result<Vec<PlaybookView>> {
        (**self).get_playbooks(ids).await
    }

    async fn list_playbooks(&self, limit: i64, offset: i64) -> Result<Vec<PlaybookView>> {
        (**self).list_playbooks(limit, offset).await
    }

    async fn count_playbooks(&self) -> Result<i64> {
        (**self).count_playbooks().await
    }

    async fn search_fuzzy(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        (**self).search_fuzzy(query, limit).await
    }

    async fn search_fulltext(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        (**self).search_fulltext(query, limit).await
    }

    async fn search_semantic(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPlaybook>> {
        (**self).search_semantic(embedding, limit).await
    }
}

#[async_trait]
impl<T: FeedbackStore + ?Sized> FeedbackStore for Arc<T> {
    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<Feedback> {
        (**self).insert_feedback(feedback).await
    }

    async fn list_feedback_for(&self, playbook_id: PlaybookId) -> Result<Vec<Feedback>> {
        (**self).list_feedback_for(playbook_id).await
    }
}

#[async_trait]
impl<T: AnalyticsStore + ?Sized> AnalyticsStore for Arc<T> {
    async fn analytics(&self) -> Result<Analytics> {
        (**self).analytics().await
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for vectors of different length or zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
