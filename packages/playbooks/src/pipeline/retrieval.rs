//! Retrieval over stored playbooks.
//!
//! Four strategies selected by [`SearchMode`]. Scores are returned raw:
//! trigram similarity for fuzzy, `ts_rank` for full-text and
//! `1 - cosine distance` for semantic. Converting to percentages is left to
//! the presentation layer.

use std::collections::HashMap;

use tracing::{debug, instrument};

use super::embed::embed_query;
use crate::error::{PlaybookError, Result};
use crate::traits::{ai::AI, store::PlaybookStore};
use crate::types::{
    config::PipelineConfig,
    id::PlaybookId,
    playbook::PlaybookView,
    search::{
        ScoredPlaybook, SearchHit, SearchMode, SearchRequest, SearchResult, SearchType,
        MAX_SEARCH_LIMIT,
    },
};

/// Stateless query engine.
pub struct Retriever<S: PlaybookStore, A: AI> {
    store: S,
    ai: A,
    config: PipelineConfig,
}

impl<S: PlaybookStore, A: AI> Retriever<S, A> {
    pub fn new(store: S, ai: A) -> Self {
        Self {
            store,
            ai,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Score, rank and hydrate playbooks for a query.
    ///
    /// A blank query or a zero limit is a `Validation` error. Limits above
    /// [`MAX_SEARCH_LIMIT`] are clamped.
    #[instrument(skip(self, request), fields(query = %request.query, mode = %request.mode, limit = request.limit))]
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(PlaybookError::Validation("query must not be empty".into()));
        }
        if request.limit == 0 {
            return Err(PlaybookError::Validation(
                "limit must be at least 1".into(),
            ));
        }
        let limit = request.limit.min(MAX_SEARCH_LIMIT);

        let hits = match request.mode {
            SearchMode::Fuzzy => single(self.store.search_fuzzy(query, limit).await?, SearchType::Fuzzy),
            SearchMode::FullText => single(
                self.store.search_fulltext(query, limit).await?,
                SearchType::FullText,
            ),
            SearchMode::Semantic => {
                let embedding = embed_query(&self.ai, query, &self.config).await?;
                single(
                    self.store.search_semantic(&embedding, limit).await?,
                    SearchType::Semantic,
                )
            }
            SearchMode::Hybrid => {
                let (fuzzy, fulltext) = tokio::try_join!(
                    self.store.search_fuzzy(query, limit),
                    self.store.search_fulltext(query, limit),
                )?;
                fuse_hybrid(fuzzy, fulltext, limit)
            }
        };

        debug!(hits = hits.len(), "Scored playbooks");
        self.hydrate(hits).await
    }

    /// Semantic search, the strategy behind "find similar playbooks".
    pub async fn search_semantic(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.search(&SearchRequest::new(query, SearchMode::Semantic).with_limit(limit))
            .await
    }

    /// Attach the full projection to each hit, keeping hit order.
    ///
    /// Hits whose playbook disappeared between scoring and hydration are dropped.
    async fn hydrate(&self, hits: Vec<SearchHit>) -> Result<Vec<SearchResult>> {
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<PlaybookId> = hits.iter().map(|h| h.id).collect();
        let mut by_id: HashMap<PlaybookId, PlaybookView> = self
            .store
            .get_playbooks(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                by_id.remove(&hit.id).map(|playbook| SearchResult {
                    playbook,
                    search_score: hit.score,
                    search_types: hit.search_types,
                })
            })
            .collect())
    }
}

fn single(rows: Vec<ScoredPlaybook>, search_type: SearchType) -> Vec<SearchHit> {
    rows.into_iter()
        .map(|row| SearchHit {
            id: row.id,
            score: row.score,
            search_types: vec![search_type],
        })
        .collect()
}

/// Merge fuzzy and full-text rows by playbook id.
///
/// A playbook found by both gets the mean of its two scores and both
/// labels. Results are ordered by score descending, then id ascending, and
/// cut to `limit`.
pub fn fuse_hybrid(
    fuzzy: Vec<ScoredPlaybook>,
    fulltext: Vec<ScoredPlaybook>,
    limit: usize,
) -> Vec<SearchHit> {
    let mut merged: HashMap<PlaybookId, SearchHit> = HashMap::new();

    let labelled = fuzzy
        .into_iter()
        .map(|row| (row, SearchType::Fuzzy))
        .chain(fulltext.into_iter().map(|row| (row, SearchType::FullText)));

    for (row, search_type) in labelled {
        match merged.get_mut(&row.id) {
            Some(hit) => {
                hit.score = (hit.score + row.score) / 2.0;
                if !hit.search_types.contains(&search_type) {
                    hit.search_types.push(search_type);
                }
            }
            None => {
                merged.insert(
                    row.id,
                    SearchHit {
                        id: row.id,
                        score: row.score,
                        search_types: vec![search_type],
                    },
                );
            }
        }
    }

    let mut hits: Vec<SearchHit> = merged.into_values().collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
    hits.truncate(limit);
    hits
}
