//! Embedding generation for playbooks and queries.
//!
//! A playbook is embedded from its task name and step actions only, so two
//! playbooks are close when their names and action verbs are close. Step
//! descriptions and failures do not contribute.

use tracing::instrument;

use super::with_deadline;
use crate::error::{PlaybookError, Result};
use crate::traits::ai::AI;
use crate::types::{config::PipelineConfig, playbook::ExtractedPlaybook};

/// Text embedded for a playbook: task name, a space, then the step actions
/// in step order joined by single spaces.
pub fn embedding_input(playbook: &ExtractedPlaybook) -> String {
    let actions: Vec<&str> = playbook.actions().collect();
    format!("{} {}", playbook.task_name, actions.join(" "))
}

/// Embed a playbook. The vector is returned unnormalized.
pub async fn embed_playbook<A: AI + ?Sized>(
    ai: &A,
    playbook: &ExtractedPlaybook,
    config: &PipelineConfig,
) -> Result<Vec<f32>> {
    embed_text(ai, &embedding_input(playbook), config).await
}

/// Embed a search query with the same model used for playbooks.
pub async fn embed_query<A: AI + ?Sized>(
    ai: &A,
    query: &str,
    config: &PipelineConfig,
) -> Result<Vec<f32>> {
    embed_text(ai, query, config).await
}

#[instrument(skip(ai, text, config), fields(text_len = text.len()))]
async fn embed_text<A: AI + ?Sized>(ai: &A, text: &str, config: &PipelineConfig) -> Result<Vec<f32>> {
    let embedding = with_deadline(config.model_timeout, "embedding", ai.embed(text)).await?;

    if embedding.len() != config.embedding_dimensions {
        return Err(PlaybookError::UpstreamModel(format!(
            "embedding has {} dimensions, expected {}",
            embedding.len(),
            config.embedding_dimensions
        )));
    }

    Ok(embedding)
}
