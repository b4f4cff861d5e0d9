//! Extraction-and-indexing pipeline.
//!
//! Write path: document → [`extract`] → [`embed`] → store, driven one
//! document at a time by the [`Orchestrator`]. Read path: [`Retriever`]
//! scores with one of four strategies and hydrates the winners.

pub mod embed;
pub mod extract;
pub mod feedback;
pub mod orchestrator;
pub mod prompts;
pub mod retrieval;
pub mod seed;

pub use embed::{embed_playbook, embed_query, embedding_input};
pub use extract::{extract_playbook, parse_extraction_response};
pub use feedback::submit_feedback;
pub use orchestrator::{DocumentFailure, Orchestrator};
pub use prompts::{format_extraction_prompt, EXTRACTION_PROMPT};
pub use retrieval::{fuse_hybrid, Retriever};
pub use seed::seed_directory;

use std::future::Future;
use std::time::Duration;

use crate::error::{PlaybookError, Result};

/// Bound an upstream model call by `deadline`.
pub(crate) async fn with_deadline<T>(
    deadline: Duration,
    call: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(PlaybookError::UpstreamModel(format!(
            "{} timed out after {}ms",
            call,
            deadline.as_millis()
        ))),
    }
}
