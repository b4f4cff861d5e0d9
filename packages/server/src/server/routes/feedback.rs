use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use playbooks::pipeline::submit_feedback;
use playbooks::{FeedbackId, NewFeedback};
use serde::Serialize;

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Serialize)]
pub struct FeedbackResponse {
    success: bool,
    message: &'static str,
    feedback_id: FeedbackId,
}

/// Record whether a playbook helped with a query.
pub async fn feedback_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<NewFeedback>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let Json(feedback) = body?;
    let saved = submit_feedback(state.deps.store.as_ref(), &feedback)
        .await
        .map_err(|e| ApiError::from(e).context("Failed to submit feedback"))?;

    Ok(Json(FeedbackResponse {
        success: true,
        message: "Feedback submitted successfully",
        feedback_id: saved.id,
    }))
}
