//! Application setup and router.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    analytics_handler, bulk_extract_handler, database_stats_handler, extract_handler,
    extract_status_handler, feedback_handler, get_playbook_handler, health_handler,
    list_playbooks_handler, playbook_search_handler, search_handler, seed_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps) -> Router {
    let state = AppState {
        deps: Arc::new(deps),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/extract", post(extract_handler).get(extract_status_handler))
        .route("/api/bulk/extract", post(bulk_extract_handler))
        .route("/api/search/advanced", get(search_handler))
        .route("/api/playbooks", get(list_playbooks_handler))
        .route("/api/playbooks/search", get(playbook_search_handler))
        .route("/api/playbooks/:id", get(get_playbook_handler))
        .route("/api/feedback", post(feedback_handler))
        .route("/api/analytics", get(analytics_handler))
        .route("/api/database/stats", get(database_stats_handler))
        .route("/api/seed", post(seed_handler))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
