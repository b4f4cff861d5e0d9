//! Typed errors for the playbook library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! "the model was unreachable" apart from "the model produced garbage".

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while extracting, storing or searching playbooks.
#[derive(Debug, Error)]
pub enum PlaybookError {
    /// Network, auth, rate-limit or deadline failure calling a model endpoint
    #[error("upstream model error: {0}")]
    UpstreamModel(String),

    /// The model answered but the body is not valid JSON or lacks required fields
    #[error("malformed extraction: {0}")]
    MalformedExtraction(String),

    /// Connection, timeout or constraint failure in the store
    #[error("persistence error: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Caller supplied malformed input
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested record(s) do not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl PlaybookError {
    /// Build a persistence error from any displayable store failure.
    pub fn persistence(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        PlaybookError::Persistence(e.into())
    }

    /// Short machine-friendly name of the error kind (used in logs and API bodies).
    pub fn kind(&self) -> &'static str {
        match self {
            PlaybookError::UpstreamModel(_) => "upstream_model",
            PlaybookError::MalformedExtraction(_) => "malformed_extraction",
            PlaybookError::Persistence(_) => "persistence",
            PlaybookError::Validation(_) => "validation",
            PlaybookError::NotFound(_) => "not_found",
            PlaybookError::Config(_) => "config",
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for PlaybookError {
    fn from(e: sqlx::Error) -> Self {
        PlaybookError::Persistence(Box::new(e))
    }
}

#[cfg(feature = "openai")]
impl From<openai_client::OpenAIError> for PlaybookError {
    fn from(e: openai_client::OpenAIError) -> Self {
        PlaybookError::UpstreamModel(e.to_string())
    }
}

/// Pipeline step a per-document failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Embed,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::Embed => write!(f, "embed"),
            Stage::Persist => write!(f, "persist"),
        }
    }
}

/// Result type alias for playbook operations.
pub type Result<T> = std::result::Result<T, PlaybookError>;
