//! End-user feedback on playbooks (append-only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{FeedbackId, PlaybookId};

/// A stored feedback entry. `playbook_id` is a weak reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub playbook_id: PlaybookId,
    pub user_query: String,
    pub was_helpful: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback submitted by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub playbook_id: PlaybookId,
    #[serde(default)]
    pub user_query: String,
    pub was_helpful: bool,
    #[serde(default)]
    pub comment: Option<String>,
}
