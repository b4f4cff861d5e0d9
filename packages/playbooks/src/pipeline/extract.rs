//! Structured extraction: document text in, validated playbook out.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::prompts::format_extraction_prompt;
use super::with_deadline;
use crate::error::{PlaybookError, Result};
use crate::traits::ai::AI;
use crate::types::{
    config::PipelineConfig,
    playbook::{CommonFailure, ExtractedPlaybook, PlaybookStep},
};

/// Model answer as it arrives. The model's own `step` numbers are not read
/// at all, since steps are renumbered from array order.
#[derive(Deserialize)]
struct ModelPlaybook {
    task_name: String,
    steps: Vec<ModelStep>,
    #[serde(default)]
    common_failures: Vec<CommonFailure>,
}

#[derive(Deserialize)]
struct ModelStep {
    action: String,
    #[serde(default)]
    description: Option<String>,
}

/// Ask the model for a playbook and validate what comes back.
///
/// One call, no retry. Transport failures and deadline overruns are
/// `UpstreamModel`; an answer that is not a usable playbook is
/// `MalformedExtraction`.
#[instrument(skip(ai, content, config), fields(content_len = content.len()))]
pub async fn extract_playbook<A: AI + ?Sized>(
    ai: &A,
    content: &str,
    config: &PipelineConfig,
) -> Result<ExtractedPlaybook> {
    let prompt = format_extraction_prompt(content);
    let raw = with_deadline(config.model_timeout, "extraction", ai.complete_json(&prompt)).await?;
    debug!(response_len = raw.len(), "Extraction response received");
    parse_extraction_response(&raw)
}

/// Parse and validate a raw model answer.
///
/// Tolerates a markdown code fence around the object. Requires a non-blank
/// `task_name` and at least one step with a non-blank `action`. Steps are
/// renumbered 1..n in the order the model listed them, whatever numbers it
/// used.
pub fn parse_extraction_response(raw: &str) -> Result<ExtractedPlaybook> {
    let json = strip_code_fence(raw);

    let value: Value = serde_json::from_str(json).map_err(|e| {
        PlaybookError::MalformedExtraction(format!("response is not valid JSON: {}", e))
    })?;

    if !value.is_object() {
        return Err(PlaybookError::MalformedExtraction(
            "response is not a JSON object".into(),
        ));
    }

    let answer: ModelPlaybook = serde_json::from_value(value).map_err(|e| {
        PlaybookError::MalformedExtraction(format!("missing or invalid fields: {}", e))
    })?;

    let task_name = answer.task_name.trim().to_string();
    if task_name.is_empty() {
        return Err(PlaybookError::MalformedExtraction(
            "task_name is empty".into(),
        ));
    }

    if answer.steps.is_empty() {
        return Err(PlaybookError::MalformedExtraction("steps is empty".into()));
    }

    let mut steps = Vec::with_capacity(answer.steps.len());
    for (i, step) in answer.steps.into_iter().enumerate() {
        if step.action.trim().is_empty() {
            return Err(PlaybookError::MalformedExtraction(format!(
                "step {} has no action",
                i + 1
            )));
        }
        steps.push(PlaybookStep::new(
            i as u32 + 1,
            step.action,
            step.description.unwrap_or_default(),
        ));
    }

    Ok(ExtractedPlaybook {
        task_name,
        steps,
        common_failures: answer.common_failures,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
