//! Playbooks: ordered operational steps plus known failure/fix pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PlaybookId;

/// Confidence assigned to freshly extracted playbooks.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// One step of a playbook. Order in the containing list is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybookStep {
    /// 1-based ordinal
    #[serde(default)]
    pub step: u32,
    /// Short imperative action (e.g. "docker build")
    pub action: String,
    #[serde(default)]
    pub description: String,
}

impl PlaybookStep {
    pub fn new(step: u32, action: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            step,
            action: action.into(),
            description: description.into(),
        }
    }
}

/// A known failure mode and its remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFailure {
    pub issue: String,
    pub fix: String,
}

impl CommonFailure {
    pub fn new(issue: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            fix: fix.into(),
        }
    }
}

/// The shape the extraction model is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPlaybook {
    pub task_name: String,
    pub steps: Vec<PlaybookStep>,
    #[serde(default)]
    pub common_failures: Vec<CommonFailure>,
}

impl ExtractedPlaybook {
    /// Step actions in execution order.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.action.as_str())
    }
}

/// A playbook ready to be inserted in one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlaybook {
    pub task_name: String,
    pub steps: Vec<PlaybookStep>,
    pub common_failures: Vec<CommonFailure>,
    pub embedding: Vec<f32>,
    pub confidence_score: f64,
}

impl NewPlaybook {
    pub fn from_extraction(
        extracted: ExtractedPlaybook,
        embedding: Vec<f32>,
        confidence_score: f64,
    ) -> Self {
        Self {
            task_name: extracted.task_name,
            steps: extracted.steps,
            common_failures: extracted.common_failures,
            embedding,
            confidence_score,
        }
    }
}

/// A stored playbook row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    pub id: PlaybookId,
    pub task_name: String,
    pub steps: Vec<PlaybookStep>,
    pub common_failures: Vec<CommonFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub confidence_score: f64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Hydrated projection returned by reads and search (no embedding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookView {
    pub id: PlaybookId,
    pub task_name: String,
    pub steps: Vec<PlaybookStep>,
    pub common_failures: Vec<CommonFailure>,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    pub view_count: i64,
}

impl From<Playbook> for PlaybookView {
    fn from(p: Playbook) -> Self {
        Self {
            id: p.id,
            task_name: p.task_name,
            steps: p.steps,
            common_failures: p.common_failures,
            confidence_score: p.confidence_score,
            created_at: p.created_at,
            view_count: p.view_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_playbook_defaults_missing_failures() {
        let parsed: ExtractedPlaybook = serde_json::from_str(
            r#"{"task_name":"Deploy","steps":[{"step":1,"action":"build","description":"b"}]}"#,
        )
        .unwrap();
        assert!(parsed.common_failures.is_empty());
        assert_eq!(parsed.actions().collect::<Vec<_>>(), vec!["build"]);
    }

    #[test]
    fn test_step_without_action_is_rejected() {
        let parsed = serde_json::from_str::<ExtractedPlaybook>(
            r#"{"task_name":"Deploy","steps":[{"step":1,"description":"b"}]}"#,
        );
        assert!(parsed.is_err());
    }
}
