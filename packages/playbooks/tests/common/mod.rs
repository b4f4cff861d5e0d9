//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use playbooks::stores::MemoryStore;
use playbooks::types::search::ScoredPlaybook;
use playbooks::{
    Analytics, AnalyticsStore, Document, DocumentId, DocumentStore, Feedback, FeedbackStore,
    NewDocument, NewFeedback, NewPlaybook, Playbook, PlaybookError, PlaybookId, PlaybookStore,
    PlaybookView, Result,
};
use std::sync::Arc;

/// Model answer for a playbook with the given name and actions.
pub fn playbook_json(task_name: &str, actions: &[&str], failures: &[(&str, &str)]) -> String {
    let steps: Vec<serde_json::Value> = actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            serde_json::json!({
                "step": i + 1,
                "action": action,
                "description": format!("Run {}", action),
            })
        })
        .collect();
    let failures: Vec<serde_json::Value> = failures
        .iter()
        .map(|(issue, fix)| serde_json::json!({"issue": issue, "fix": fix}))
        .collect();
    serde_json::json!({
        "task_name": task_name,
        "steps": steps,
        "common_failures": failures,
    })
    .to_string()
}

/// A `MemoryStore` whose scoring and inserts can be scripted.
///
/// Unscripted calls go to the inner store.
pub struct ScriptedStore {
    pub inner: Arc<MemoryStore>,
    pub fuzzy: Option<Vec<ScoredPlaybook>>,
    pub fulltext: Option<Vec<ScoredPlaybook>>,
    pub fail_insert_for: Option<String>,
}

impl ScriptedStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fuzzy: None,
            fulltext: None,
            fail_insert_for: None,
        }
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        self.inner.list_documents().await
    }

    async fn get_documents(&self, ids: &[DocumentId]) -> Result<Vec<Document>> {
        self.inner.get_documents(ids).await
    }

    async fn insert_document(&self, document: &NewDocument) -> Result<Document> {
        self.inner.insert_document(document).await
    }

    async fn count_documents(&self) -> Result<i64> {
        self.inner.count_documents().await
    }
}

#[async_trait]
impl PlaybookStore for ScriptedStore {
    async fn insert_playbook(&self, playbook: &NewPlaybook) -> Result<Playbook> {
        if self.fail_insert_for.as_deref() == Some(playbook.task_name.as_str()) {
            return Err(PlaybookError::persistence("canceling statement due to statement timeout"));
        }
        self.inner.insert_playbook(playbook).await
    }

    async fn get_playbook(&self, id: PlaybookId) -> Result<Option<PlaybookView>> {
        self.inner.get_playbook(id).await
    }

    async fn get_playbooks(&self, ids: &[PlaybookId]) -> Result<Vec<PlaybookView>> {
        self.inner.get_playbooks(ids).await
    }

    async fn list_playbooks(&self, limit: i64, offset: i64) -> Result<Vec<PlaybookView>> {
        self.inner.list_playbooks(limit, offset).await
    }

    async fn count_playbooks(&self) -> Result<i64> {
        self.inner.count_playbooks().await
    }

    async fn search_fuzzy(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        match &self.fuzzy {
            Some(rows) => Ok(rows.clone()),
            None => self.inner.search_fuzzy(query, limit).await,
        }
    }

    async fn search_fulltext(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        match &self.fulltext {
            Some(rows) => Ok(rows.clone()),
            None => self.inner.search_fulltext(query, limit).await,
        }
    }

    async fn search_semantic(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPlaybook>> {
        self.inner.search_semantic(embedding, limit).await
    }
}

#[async_trait]
impl FeedbackStore for ScriptedStore {
    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<Feedback> {
        self.inner.insert_feedback(feedback).await
    }

    async fn list_feedback_for(&self, playbook_id: PlaybookId) -> Result<Vec<Feedback>> {
        self.inner.list_feedback_for(playbook_id).await
    }
}

#[async_trait]
impl AnalyticsStore for ScriptedStore {
    async fn analytics(&self) -> Result<Analytics> {
        self.inner.analytics().await
    }
}
