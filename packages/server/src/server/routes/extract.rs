//! Extraction endpoints: full corpus, status check and selective bulk runs.

use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use playbooks::{BulkExtractionReport, DocumentId, ExtractionReport};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Serialize)]
pub struct ExtractResponse {
    success: bool,
    message: String,
    extracted: usize,
    failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    playbooks: Option<Vec<playbooks::types::report::ExtractedRef>>,
}

impl From<ExtractionReport> for ExtractResponse {
    fn from(report: ExtractionReport) -> Self {
        if report.processed == 0 {
            return Self {
                success: false,
                message: "No documents found in the database".to_string(),
                extracted: 0,
                failed: 0,
                playbooks: None,
            };
        }
        Self {
            success: true,
            message: format!(
                "Extraction complete! Processed {} documents.",
                report.processed
            ),
            extracted: report.extracted,
            failed: report.failed,
            playbooks: Some(report.playbooks),
        }
    }
}

/// Run extraction over every document.
///
/// Per-document failures are counted, never fatal; only a failure to load
/// the corpus turns into a 500.
pub async fn extract_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let report = state
        .deps
        .orchestrator()
        .extract_all()
        .await
        .map_err(|e| ApiError::from(e).context("Extraction failed"))?;
    Ok(Json(report.into()))
}

#[derive(Serialize)]
pub struct ExtractStatusResponse {
    documents: i64,
    playbooks: i64,
    status: &'static str,
}

pub async fn extract_status_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<ExtractStatusResponse>, ApiError> {
    let status = state
        .deps
        .orchestrator()
        .status()
        .await
        .map_err(|e| ApiError::from(e).context("Failed to get status"))?;
    Ok(Json(ExtractStatusResponse {
        documents: status.documents,
        playbooks: status.playbooks,
        status: "ready",
    }))
}

#[derive(Deserialize)]
pub struct BulkExtractRequest {
    #[serde(default)]
    document_ids: Vec<DocumentId>,
}

#[derive(Serialize)]
pub struct BulkExtractResponse {
    success: bool,
    #[serde(flatten)]
    report: BulkExtractionReport,
}

/// Extract a chosen subset of documents.
pub async fn bulk_extract_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<BulkExtractRequest>, JsonRejection>,
) -> Result<Json<BulkExtractResponse>, ApiError> {
    let Json(request) =
        body.map_err(|_| ApiError::BadRequest("document_ids array required".into()))?;
    if request.document_ids.is_empty() {
        return Err(ApiError::BadRequest("document_ids array required".into()));
    }

    let report = state
        .deps
        .orchestrator()
        .extract_documents(&request.document_ids)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::NotFound(_) => ApiError::NotFound("No documents found".into()),
            other => other.context("Bulk extraction failed"),
        })?;

    Ok(Json(BulkExtractResponse {
        success: true,
        report,
    }))
}
