//! Search endpoints.
//!
//! Scores leave the library raw; these handlers turn them into rounded
//! percentages for display.

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    Json,
};
use playbooks::types::search::DEFAULT_SEARCH_LIMIT;
use playbooks::{PlaybookView, SearchMode, SearchRequest, SearchResult, SearchType};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct AdvancedSearchParams {
    q: Option<String>,
    mode: Option<String>,
    limit: Option<usize>,
}

#[derive(Serialize)]
pub struct AdvancedSearchHit {
    #[serde(flatten)]
    playbook: PlaybookView,
    search_score: i64,
    search_types: Vec<SearchType>,
}

impl From<SearchResult> for AdvancedSearchHit {
    fn from(result: SearchResult) -> Self {
        Self {
            search_score: result.score_percent(),
            playbook: result.playbook,
            search_types: result.search_types,
        }
    }
}

#[derive(Serialize)]
pub struct AdvancedSearchResponse {
    results: Vec<AdvancedSearchHit>,
    count: usize,
    query: String,
    mode: SearchMode,
}

/// Multi-mode search: `?q=...&mode=fuzzy|fulltext|semantic|hybrid&limit=N`.
pub async fn search_handler(
    Extension(state): Extension<AppState>,
    params: Result<Query<AdvancedSearchParams>, QueryRejection>,
) -> Result<Json<AdvancedSearchResponse>, ApiError> {
    let Query(params) = params?;
    let query = required_query(params.q, "Query parameter required")?;
    let mode = match params.mode.as_deref() {
        Some(mode) => mode.parse::<SearchMode>()?,
        None => SearchMode::default(),
    };
    let request =
        SearchRequest::new(&query, mode).with_limit(params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT));

    let results = state
        .deps
        .retriever()
        .search(&request)
        .await
        .map_err(|e| ApiError::from(e).context("Search failed"))?;

    let results: Vec<AdvancedSearchHit> = results.into_iter().map(Into::into).collect();
    Ok(Json(AdvancedSearchResponse {
        count: results.len(),
        results,
        query,
        mode,
    }))
}

#[derive(Deserialize)]
pub struct SemanticSearchParams {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SemanticSearchHit {
    #[serde(flatten)]
    playbook: PlaybookView,
    similarity: i64,
}

#[derive(Serialize)]
pub struct SemanticSearchResponse {
    query: String,
    results: Vec<SemanticSearchHit>,
    count: usize,
}

/// Semantic search: `?q=...&limit=N`, similarity as a percentage.
pub async fn playbook_search_handler(
    Extension(state): Extension<AppState>,
    params: Result<Query<SemanticSearchParams>, QueryRejection>,
) -> Result<Json<SemanticSearchResponse>, ApiError> {
    let Query(params) = params?;
    let query = required_query(params.q, "Query parameter \"q\" is required")?;

    let results = state
        .deps
        .retriever()
        .search_semantic(&query, params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await
        .map_err(|e| ApiError::from(e).context("Failed to search playbooks"))?;

    let results: Vec<SemanticSearchHit> = results
        .into_iter()
        .map(|result| SemanticSearchHit {
            similarity: result.score_percent(),
            playbook: result.playbook,
        })
        .collect();

    Ok(Json(SemanticSearchResponse {
        query,
        count: results.len(),
        results,
    }))
}

fn required_query(q: Option<String>, message: &str) -> Result<String, ApiError> {
    match q {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(ApiError::BadRequest(message.to_string())),
    }
}
