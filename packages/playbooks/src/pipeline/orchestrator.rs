//! Orchestrator: fetch → extract → embed → persist, one document at a time.

use thiserror::Error;
use tracing::{info, instrument, warn};

use super::{embed::embed_playbook, extract::extract_playbook};
use crate::error::{PlaybookError, Result, Stage};
use crate::traits::{ai::AI, store::Store};
use crate::types::{
    config::PipelineConfig,
    document::Document,
    id::DocumentId,
    playbook::{NewPlaybook, Playbook},
    report::{
        BulkExtractionReport, BulkFailure, BulkSuccess, ExtractedRef, ExtractionReport,
        PipelineStatus,
    },
};

/// A single document that did not make it through the pipeline.
#[derive(Debug, Error)]
#[error("document {document_id}: {stage} failed: {error}")]
pub struct DocumentFailure {
    pub document_id: DocumentId,
    pub stage: Stage,
    #[source]
    pub error: PlaybookError,
}

/// Drives extraction over the document corpus.
///
/// Documents are processed strictly in sequence: the upstream model is rate
/// limited, and one in-flight document per run keeps writes from
/// interleaving. A failed document is logged and counted; the run moves on.
///
/// There is no deduplication. Running twice over the same documents stores
/// a second playbook for each.
///
/// # Example
///
/// ```rust,ignore
/// use playbooks::{MemoryStore, Orchestrator, testing::MockAI};
///
/// let orchestrator = Orchestrator::new(MemoryStore::new(), MockAI::new());
/// let report = orchestrator.extract_all().await?;
/// println!("{} extracted, {} failed", report.extracted, report.failed);
/// ```
pub struct Orchestrator<S: Store, A: AI> {
    store: S,
    ai: A,
    config: PipelineConfig,
}

impl<S: Store, A: AI> Orchestrator<S, A> {
    /// Create an orchestrator with default configuration.
    pub fn new(store: S, ai: A) -> Self {
        Self {
            store,
            ai,
            config: PipelineConfig::default(),
        }
    }

    /// Replace the pipeline configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ai(&self) -> &A {
        &self.ai
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every document in the corpus through the pipeline.
    ///
    /// Only a failure to load the corpus is returned as an error. An empty
    /// corpus yields a report with `processed == 0`.
    #[instrument(skip(self))]
    pub async fn extract_all(&self) -> Result<ExtractionReport> {
        let documents = self.store.list_documents().await?;
        info!(documents = documents.len(), "Starting full-corpus extraction");

        let mut report = ExtractionReport::default();
        for document in &documents {
            report.processed += 1;
            match self.process_document(document).await {
                Ok(playbook) => {
                    report.extracted += 1;
                    report.playbooks.push(ExtractedRef {
                        id: playbook.id,
                        task_name: playbook.task_name,
                    });
                }
                Err(_) => report.failed += 1,
            }
        }

        info!(
            processed = report.processed,
            extracted = report.extracted,
            failed = report.failed,
            "Full-corpus extraction complete"
        );
        Ok(report)
    }

    /// Run the listed documents through the pipeline.
    ///
    /// Ids that match no document are skipped. An empty list is a
    /// `Validation` error and a list matching nothing is `NotFound`; in both
    /// cases no work is done.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn extract_documents(&self, ids: &[DocumentId]) -> Result<BulkExtractionReport> {
        if ids.is_empty() {
            return Err(PlaybookError::Validation(
                "document_ids must be a non-empty array".into(),
            ));
        }

        let documents = self.store.get_documents(ids).await?;
        if documents.is_empty() {
            return Err(PlaybookError::NotFound(
                "no documents found for the requested ids".into(),
            ));
        }
        if documents.len() < ids.len() {
            warn!(
                requested = ids.len(),
                found = documents.len(),
                "Some requested documents do not exist"
            );
        }

        let mut report = BulkExtractionReport::default();
        for document in &documents {
            report.processed += 1;
            match self.process_document(document).await {
                Ok(playbook) => {
                    report.successful += 1;
                    report.results.push(BulkSuccess {
                        document_id: document.id,
                        playbook_id: playbook.id,
                        task_name: playbook.task_name,
                        confidence_score: playbook.confidence_score,
                    });
                }
                Err(failure) => {
                    report.failed += 1;
                    report.errors.push(BulkFailure {
                        document_id: failure.document_id,
                        stage: failure.stage,
                        error_message: failure.error.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.processed,
            successful = report.successful,
            failed = report.failed,
            "Bulk extraction complete"
        );
        Ok(report)
    }

    /// Extract, embed and persist one document.
    ///
    /// The model calls happen before any write; the insert is one statement,
    /// so a failure at any stage leaves no playbook row behind.
    #[instrument(skip(self, document), fields(document_id = %document.id, source = %document.source))]
    pub async fn process_document(
        &self,
        document: &Document,
    ) -> std::result::Result<Playbook, DocumentFailure> {
        let extracted = extract_playbook(&self.ai, &document.content, &self.config)
            .await
            .map_err(|e| self.failure(document, Stage::Extract, e))?;

        let embedding = embed_playbook(&self.ai, &extracted, &self.config)
            .await
            .map_err(|e| self.failure(document, Stage::Embed, e))?;

        let new_playbook =
            NewPlaybook::from_extraction(extracted, embedding, self.config.default_confidence);
        let playbook = self
            .store
            .insert_playbook(&new_playbook)
            .await
            .map_err(|e| self.failure(document, Stage::Persist, e))?;

        info!(
            playbook_id = %playbook.id,
            task_name = %playbook.task_name,
            steps = playbook.steps.len(),
            "Playbook extracted"
        );
        Ok(playbook)
    }

    /// Document and playbook counts.
    pub async fn status(&self) -> Result<PipelineStatus> {
        Ok(PipelineStatus {
            documents: self.store.count_documents().await?,
            playbooks: self.store.count_playbooks().await?,
        })
    }

    fn failure(&self, document: &Document, stage: Stage, error: PlaybookError) -> DocumentFailure {
        warn!(
            document_id = %document.id,
            stage = %stage,
            kind = error.kind(),
            error = %error,
            "Document failed"
        );
        DocumentFailure {
            document_id: document.id,
            stage,
            error,
        }
    }
}
