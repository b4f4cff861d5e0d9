use axum::{extract::Extension, Json};
use playbooks::{Analytics, AnalyticsStore, DatabaseStats};

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Collection overview, creation timeline, common failures and feedback rates.
pub async fn analytics_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Analytics>, ApiError> {
    let analytics = state
        .deps
        .store
        .analytics()
        .await
        .map_err(|e| ApiError::from(e).context("Failed to fetch analytics"))?;
    Ok(Json(analytics))
}

/// Extensions, indexes, table sizes and search readiness. Postgres only.
pub async fn database_stats_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<DatabaseStats>, ApiError> {
    let Some(postgres) = state.deps.postgres.as_ref() else {
        return Err(ApiError::Unavailable(
            "Database stats require the Postgres store".into(),
        ));
    };
    let stats = postgres
        .database_stats()
        .await
        .map_err(|e| ApiError::from(e).context("Failed to fetch database stats"))?;
    Ok(Json(stats))
}
