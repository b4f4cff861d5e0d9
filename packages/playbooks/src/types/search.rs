//! Retrieval request/response types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::PlaybookId;
use super::playbook::PlaybookView;
use crate::error::PlaybookError;

/// Default number of results.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Upper bound on requested results.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Trigram similarity on the task name
    Fuzzy,
    /// Ranked full-text search
    #[serde(rename = "fulltext")]
    FullText,
    /// Nearest neighbours of the query embedding
    Semantic,
    /// Fuzzy + full-text fused by score averaging (no embedding call)
    #[default]
    Hybrid,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Fuzzy => write!(f, "fuzzy"),
            SearchMode::FullText => write!(f, "fulltext"),
            SearchMode::Semantic => write!(f, "semantic"),
            SearchMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = PlaybookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fuzzy" => Ok(SearchMode::Fuzzy),
            "fulltext" => Ok(SearchMode::FullText),
            "semantic" => Ok(SearchMode::Semantic),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(PlaybookError::Validation(format!(
                "unknown search mode '{}' (expected fuzzy, fulltext, semantic or hybrid)",
                other
            ))),
        }
    }
}

/// Label of the strategy that matched a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Fuzzy,
    #[serde(rename = "fulltext")]
    FullText,
    Semantic,
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchType::Fuzzy => write!(f, "fuzzy"),
            SearchType::FullText => write!(f, "fulltext"),
            SearchType::Semantic => write!(f, "semantic"),
        }
    }
}

/// Lightweight row returned by a scoring query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPlaybook {
    pub id: PlaybookId,
    pub task_name: String,
    pub score: f64,
}

impl ScoredPlaybook {
    pub fn new(id: impl Into<PlaybookId>, task_name: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            task_name: task_name.into(),
            score,
        }
    }
}

/// A scored id after strategy dispatch (and fusion, in hybrid mode).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: PlaybookId,
    pub score: f64,
    pub search_types: Vec<SearchType>,
}

/// A retrieval query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            query: query.into(),
            mode,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A hydrated, ranked result. `search_score` is the raw score of the strategy
/// (similarity in [0,1] for fuzzy/semantic, engine rank for full-text).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub playbook: PlaybookView,
    pub search_score: f64,
    pub search_types: Vec<SearchType>,
}

impl SearchResult {
    /// Score as a rounded 0-100 percentage, for display.
    pub fn score_percent(&self) -> i64 {
        (self.search_score * 100.0).round() as i64
    }
}
