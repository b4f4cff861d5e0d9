use axum::{extract::Extension, Json};
use playbooks::pipeline::seed_directory;
use serde::Serialize;

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Serialize)]
pub struct SeededDocument {
    source: String,
    length: usize,
}

#[derive(Serialize)]
pub struct SeedResponse {
    success: bool,
    message: String,
    documents: Vec<SeededDocument>,
}

/// Load the configured sample-docs directory into the document table.
pub async fn seed_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<SeedResponse>, ApiError> {
    let documents = seed_directory(state.deps.store.as_ref(), &state.deps.sample_docs_dir)
        .await
        .map_err(|e| ApiError::from(e).context("Failed to seed database"))?;

    Ok(Json(SeedResponse {
        success: true,
        message: format!("Seeded {} documents", documents.len()),
        documents: documents
            .into_iter()
            .map(|doc| SeededDocument {
                length: doc.content.chars().count(),
                source: doc.source,
            })
            .collect(),
    }))
}
