//! HTTP error envelope.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use playbooks::PlaybookError;
use serde_json::json;

/// Errors returned from route handlers.
///
/// Client errors render as `{"error": message}`; server errors as
/// `{"error": label, "details": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal { error: String, details: String },
}

impl ApiError {
    /// Replace the label of a server error (e.g. "Search failed").
    pub fn context(self, label: &str) -> Self {
        match self {
            ApiError::Internal { details, .. } => ApiError::Internal {
                error: label.to_string(),
                details,
            },
            other => other,
        }
    }
}

impl From<PlaybookError> for ApiError {
    fn from(e: PlaybookError) -> Self {
        match e {
            PlaybookError::Validation(msg) => ApiError::BadRequest(msg),
            PlaybookError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal {
                error: "Request failed".to_string(),
                details: other.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(error) => (StatusCode::BAD_REQUEST, json!({ "error": error })),
            ApiError::NotFound(error) => (StatusCode::NOT_FOUND, json!({ "error": error })),
            ApiError::Unavailable(error) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": error }))
            }
            ApiError::Internal { error, details } => {
                tracing::error!(error = %error, details = %details, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": error, "details": details }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playbook_errors_map_to_status() {
        let bad: ApiError = PlaybookError::Validation("empty".into()).into();
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let missing: ApiError = PlaybookError::NotFound("gone".into()).into();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let upstream: ApiError = PlaybookError::UpstreamModel("503".into()).into();
        assert_eq!(
            upstream.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_only_relabels_server_errors() {
        let err = ApiError::from(PlaybookError::persistence("timeout")).context("Search failed");
        assert!(matches!(err, ApiError::Internal { ref error, .. } if error == "Search failed"));

        let err = ApiError::BadRequest("q".into()).context("Search failed");
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
