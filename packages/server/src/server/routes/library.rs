use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    Json,
};
use playbooks::{PlaybookError, PlaybookId, PlaybookStore, PlaybookView};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page_size")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_page_size() -> i64 {
    50
}

#[derive(Serialize)]
pub struct ListPlaybooksResponse {
    playbooks: Vec<PlaybookView>,
    total: i64,
}

/// Page through playbooks, newest first.
pub async fn list_playbooks_handler(
    Extension(state): Extension<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListPlaybooksResponse>, ApiError> {
    let Query(params) = params?;
    if params.limit < 1 || params.offset < 0 {
        return Err(ApiError::BadRequest(
            "limit must be positive and offset non-negative".into(),
        ));
    }

    let store = &state.deps.store;
    let fetch = async {
        let playbooks = store.list_playbooks(params.limit, params.offset).await?;
        let total = store.count_playbooks().await?;
        Ok::<_, PlaybookError>(ListPlaybooksResponse { playbooks, total })
    };
    let response = fetch
        .await
        .map_err(|e| ApiError::from(e).context("Failed to fetch playbooks"))?;
    Ok(Json(response))
}

pub async fn get_playbook_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlaybookView>, ApiError> {
    state
        .deps
        .store
        .get_playbook(PlaybookId(id))
        .await
        .map_err(|e| ApiError::from(e).context("Failed to fetch playbook"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Playbook not found".into()))
}
