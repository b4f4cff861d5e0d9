//! Aggregate outcomes of extraction runs.

use serde::Serialize;

use super::id::{DocumentId, PlaybookId};
use crate::error::Stage;

/// Reference to a playbook created during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRef {
    pub id: PlaybookId,
    pub task_name: String,
}

/// Result of a full-corpus run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// Documents loaded from the corpus
    pub processed: usize,
    pub extracted: usize,
    pub failed: usize,
    pub playbooks: Vec<ExtractedRef>,
}

/// Successful entry of a selective bulk run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkSuccess {
    pub document_id: DocumentId,
    pub playbook_id: PlaybookId,
    pub task_name: String,
    pub confidence_score: f64,
}

/// Failed entry of a selective bulk run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub document_id: DocumentId,
    pub stage: Stage,
    pub error_message: String,
}

/// Result of a selective bulk run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkExtractionReport {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BulkSuccess>,
    pub errors: Vec<BulkFailure>,
}

/// Corpus/collection size check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStatus {
    pub documents: i64,
    pub playbooks: i64,
}
