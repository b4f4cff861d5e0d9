//! Source documents (read-only input to extraction).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::DocumentId;

/// A stored free-text document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// File name or label the content came from
    pub source: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A document about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub source: String,
    pub content: String,
}

impl NewDocument {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}
