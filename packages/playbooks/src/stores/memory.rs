//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use super::{ranked, text};
use crate::error::Result;
use crate::traits::store::{
    cosine_similarity, AnalyticsStore, DocumentStore, FeedbackStore, PlaybookStore,
};
use crate::types::{
    analytics::{Analytics, FailureCount, FeedbackStats, Overview, StepCount, TimelinePoint},
    document::{Document, NewDocument},
    feedback::{Feedback, NewFeedback},
    id::{DocumentId, FeedbackId, PlaybookId},
    playbook::{NewPlaybook, Playbook, PlaybookView},
    search::ScoredPlaybook,
};

// Field weights mirroring setweight(.., 'A' | 'B' | 'C') on search_vector.
const TASK_NAME_WEIGHT: f64 = 1.0;
const STEPS_WEIGHT: f64 = 0.4;
const FAILURES_WEIGHT: f64 = 0.2;

#[derive(Default)]
struct Tables {
    documents: Vec<Document>,
    playbooks: Vec<Playbook>,
    feedback: Vec<Feedback>,
    next_document_id: i64,
    next_playbook_id: i64,
    next_feedback_id: i64,
}

/// In-memory storage for documents, playbooks and feedback.
///
/// Ids are assigned sequentially from 1, like `BIGSERIAL`. Data is lost on
/// drop. Fuzzy and full-text scoring are approximations of the Postgres
/// functions (see [`text`](super::text)).
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored documents.
    pub fn document_count(&self) -> usize {
        self.tables.read().unwrap().documents.len()
    }

    /// Get the number of stored playbooks.
    pub fn playbook_count(&self) -> usize {
        self.tables.read().unwrap().playbooks.len()
    }

    /// All stored playbooks including embeddings, in insertion order.
    pub fn playbooks(&self) -> Vec<Playbook> {
        self.tables.read().unwrap().playbooks.clone()
    }

    /// Insert a playbook with an explicit embedding state, bypassing the
    /// pipeline. Used to set up retrieval fixtures (e.g. rows without vectors).
    pub fn insert_raw(&self, playbook: &NewPlaybook, embedding: Option<Vec<f32>>) -> Playbook {
        let mut tables = self.tables.write().unwrap();
        tables.next_playbook_id += 1;
        let row = Playbook {
            id: PlaybookId(tables.next_playbook_id),
            task_name: playbook.task_name.clone(),
            steps: playbook.steps.clone(),
            common_failures: playbook.common_failures.clone(),
            embedding,
            confidence_score: playbook.confidence_score,
            view_count: 0,
            created_at: Utc::now(),
        };
        tables.playbooks.push(row.clone());
        row
    }

    #[cfg(test)]
    fn backdate(&self, id: PlaybookId, created_at: chrono::DateTime<Utc>) {
        let mut tables = self.tables.write().unwrap();
        if let Some(row) = tables.playbooks.iter_mut().find(|p| p.id == id) {
            row.created_at = created_at;
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(self.tables.read().unwrap().documents.clone())
    }

    async fn get_documents(&self, ids: &[DocumentId]) -> Result<Vec<Document>> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .documents
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }

    async fn insert_document(&self, document: &NewDocument) -> Result<Document> {
        let mut tables = self.tables.write().unwrap();
        tables.next_document_id += 1;
        let row = Document {
            id: DocumentId(tables.next_document_id),
            source: document.source.clone(),
            content: document.content.clone(),
            created_at: Utc::now(),
        };
        tables.documents.push(row.clone());
        Ok(row)
    }

    async fn count_documents(&self) -> Result<i64> {
        Ok(self.tables.read().unwrap().documents.len() as i64)
    }
}

#[async_trait]
impl PlaybookStore for MemoryStore {
    async fn insert_playbook(&self, playbook: &NewPlaybook) -> Result<Playbook> {
        Ok(self.insert_raw(playbook, Some(playbook.embedding.clone())))
    }

    async fn get_playbook(&self, id: PlaybookId) -> Result<Option<PlaybookView>> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .playbooks
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(PlaybookView::from))
    }

    async fn get_playbooks(&self, ids: &[PlaybookId]) -> Result<Vec<PlaybookView>> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .playbooks
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .map(PlaybookView::from)
            .collect())
    }

    async fn list_playbooks(&self, limit: i64, offset: i64) -> Result<Vec<PlaybookView>> {
        let tables = self.tables.read().unwrap();
        let mut rows: Vec<&Playbook> = tables.playbooks.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .map(PlaybookView::from)
            .collect())
    }

    async fn count_playbooks(&self) -> Result<i64> {
        Ok(self.tables.read().unwrap().playbooks.len() as i64)
    }

    async fn search_fuzzy(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        let rows = self
            .tables
            .read()
            .unwrap()
            .playbooks
            .iter()
            .filter_map(|p| {
                text::fuzzy_score(query, &p.task_name)
                    .map(|score| ScoredPlaybook::new(p.id, p.task_name.clone(), score))
            })
            .collect();
        Ok(ranked(rows, limit))
    }

    async fn search_fulltext(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        let rows = self
            .tables
            .read()
            .unwrap()
            .playbooks
            .iter()
            .filter_map(|p| {
                let steps = p
                    .steps
                    .iter()
                    .map(|s| format!("{} {}", s.action, s.description))
                    .collect::<Vec<_>>()
                    .join(" ");
                let failures = p
                    .common_failures
                    .iter()
                    .map(|f| format!("{} {}", f.issue, f.fix))
                    .collect::<Vec<_>>()
                    .join(" ");
                let fields = [
                    (p.task_name.as_str(), TASK_NAME_WEIGHT),
                    (steps.as_str(), STEPS_WEIGHT),
                    (failures.as_str(), FAILURES_WEIGHT),
                ];
                text::fulltext_rank(query, &fields)
                    .map(|score| ScoredPlaybook::new(p.id, p.task_name.clone(), score))
            })
            .collect();
        Ok(ranked(rows, limit))
    }

    async fn search_semantic(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPlaybook>> {
        let rows = self
            .tables
            .read()
            .unwrap()
            .playbooks
            .iter()
            .filter_map(|p| {
                p.embedding.as_ref().map(|e| {
                    let score = cosine_similarity(embedding, e) as f64;
                    ScoredPlaybook::new(p.id, p.task_name.clone(), score)
                })
            })
            .collect();
        Ok(ranked(rows, limit))
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<Feedback> {
        let mut tables = self.tables.write().unwrap();
        tables.next_feedback_id += 1;
        let row = Feedback {
            id: FeedbackId(tables.next_feedback_id),
            playbook_id: feedback.playbook_id,
            user_query: feedback.user_query.clone(),
            was_helpful: feedback.was_helpful,
            comment: feedback.comment.clone(),
            created_at: Utc::now(),
        };
        tables.feedback.push(row.clone());
        Ok(row)
    }

    async fn list_feedback_for(&self, playbook_id: PlaybookId) -> Result<Vec<Feedback>> {
        let mut rows: Vec<Feedback> = self
            .tables
            .read()
            .unwrap()
            .feedback
            .iter()
            .filter(|f| f.playbook_id == playbook_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn analytics(&self) -> Result<Analytics> {
        let tables = self.tables.read().unwrap();

        let avg_steps = if tables.playbooks.is_empty() {
            0.0
        } else {
            let total: usize = tables.playbooks.iter().map(|p| p.steps.len()).sum();
            total as f64 / tables.playbooks.len() as f64
        };

        let since = Utc::now() - Duration::days(7);
        let mut per_day: HashMap<chrono::NaiveDate, i64> = HashMap::new();
        for p in tables.playbooks.iter().filter(|p| p.created_at >= since) {
            *per_day.entry(p.created_at.date_naive()).or_default() += 1;
        }
        let mut timeline: Vec<TimelinePoint> = per_day
            .into_iter()
            .map(|(date, count)| TimelinePoint { date, count })
            .collect();
        timeline.sort_by(|a, b| b.date.cmp(&a.date));

        let mut issues: HashMap<&str, i64> = HashMap::new();
        for failure in tables.playbooks.iter().flat_map(|p| &p.common_failures) {
            *issues.entry(failure.issue.as_str()).or_default() += 1;
        }
        let mut common_failures: Vec<FailureCount> = issues
            .into_iter()
            .map(|(issue, count)| FailureCount {
                issue: issue.to_string(),
                count,
            })
            .collect();
        common_failures.sort_by(|a, b| b.count.cmp(&a.count).then(a.issue.cmp(&b.issue)));
        common_failures.truncate(10);

        let helpful = tables.feedback.iter().filter(|f| f.was_helpful).count() as i64;
        let not_helpful = tables.feedback.len() as i64 - helpful;

        let mut top_playbooks: Vec<StepCount> = tables
            .playbooks
            .iter()
            .map(|p| StepCount {
                id: p.id,
                task_name: p.task_name.clone(),
                step_count: p.steps.len() as i64,
            })
            .collect();
        top_playbooks.sort_by(|a, b| b.step_count.cmp(&a.step_count).then(a.id.cmp(&b.id)));
        top_playbooks.truncate(5);

        Ok(Analytics {
            overview: Overview {
                documents: tables.documents.len() as i64,
                playbooks: tables.playbooks.len() as i64,
                feedback: tables.feedback.len() as i64,
                avg_steps,
            },
            timeline,
            common_failures,
            feedback: FeedbackStats::new(helpful, not_helpful),
            top_playbooks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::playbook::{CommonFailure, PlaybookStep};

    fn new_playbook(task_name: &str, actions: &[&str], embedding: Vec<f32>) -> NewPlaybook {
        NewPlaybook {
            task_name: task_name.to_string(),
            steps: actions
                .iter()
                .enumerate()
                .map(|(i, a)| PlaybookStep::new(i as u32 + 1, *a, ""))
                .collect(),
            common_failures: vec![CommonFailure::new("Image push denied", "docker login")],
            embedding,
            confidence_score: 0.8,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store.insert_document(&NewDocument::new("a.md", "a")).await.unwrap();
        let b = store.insert_document(&NewDocument::new("b.md", "b")).await.unwrap();
        assert_eq!(a.id, DocumentId(1));
        assert_eq!(b.id, DocumentId(2));

        let found = store.get_documents(&[DocumentId(2), DocumentId(9)]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, "b.md");
    }

    #[tokio::test]
    async fn test_semantic_excludes_missing_embeddings() {
        let store = MemoryStore::new();
        store
            .insert_playbook(&new_playbook("Deploy service", &["docker build"], vec![1.0, 0.0]))
            .await
            .unwrap();
        store.insert_raw(&new_playbook("Backup database", &["pg_dump"], vec![]), None);

        let results = store.search_semantic(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].task_name, "Deploy service");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_fuzzy_and_fulltext() {
        let store = MemoryStore::new();
        store
            .insert_playbook(&new_playbook(
                "Deploy service to Kubernetes",
                &["docker build", "kubectl apply"],
                vec![1.0],
            ))
            .await
            .unwrap();
        store
            .insert_playbook(&new_playbook("Rotate TLS certificates", &["certbot renew"], vec![1.0]))
            .await
            .unwrap();

        let fuzzy = store.search_fuzzy("kubernetes", 10).await.unwrap();
        assert_eq!(fuzzy.len(), 1);
        assert_eq!(fuzzy[0].id, PlaybookId(1));

        let fulltext = store.search_fulltext("kubectl", 10).await.unwrap();
        assert_eq!(fulltext.len(), 1);
        assert_eq!(fulltext[0].id, PlaybookId(1));

        let failures = store.search_fulltext("docker login", 10).await.unwrap();
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test]
    async fn test_list_playbooks_newest_first() {
        let store = MemoryStore::new();
        for name in ["First", "Second", "Third"] {
            store.insert_playbook(&new_playbook(name, &["run"], vec![1.0])).await.unwrap();
        }

        let page = store.list_playbooks(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].task_name, "Third");

        let rest = store.list_playbooks(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].task_name, "First");
    }

    #[tokio::test]
    async fn test_analytics() {
        let store = MemoryStore::new();
        store.insert_document(&NewDocument::new("a.md", "a")).await.unwrap();
        let p = store
            .insert_playbook(&new_playbook("Deploy", &["build", "push", "apply"], vec![1.0]))
            .await
            .unwrap();
        store
            .insert_playbook(&new_playbook("Backup", &["dump"], vec![1.0]))
            .await
            .unwrap();
        for helpful in [true, true, false] {
            store
                .insert_feedback(&NewFeedback {
                    playbook_id: p.id,
                    user_query: "deploy".into(),
                    was_helpful: helpful,
                    comment: None,
                })
                .await
                .unwrap();
        }

        let analytics = store.analytics().await.unwrap();
        assert_eq!(analytics.overview.documents, 1);
        assert_eq!(analytics.overview.playbooks, 2);
        assert_eq!(analytics.overview.feedback, 3);
        assert!((analytics.overview.avg_steps - 2.0).abs() < 1e-9);
        assert_eq!(analytics.timeline.iter().map(|t| t.count).sum::<i64>(), 2);
        assert_eq!(analytics.common_failures[0].issue, "Image push denied");
        assert_eq!(analytics.common_failures[0].count, 2);
        assert_eq!(analytics.feedback.helpful_rate, 67);
        assert_eq!(analytics.top_playbooks[0].task_name, "Deploy");
    }

    #[tokio::test]
    async fn test_timeline_is_newest_first_and_skips_old_rows() {
        let store = MemoryStore::new();
        let today = store.insert_raw(&new_playbook("Today", &["a"], vec![]), None);
        let earlier = store.insert_raw(&new_playbook("Earlier", &["b"], vec![]), None);
        let stale = store.insert_raw(&new_playbook("Stale", &["c"], vec![]), None);
        store.backdate(earlier.id, today.created_at - Duration::days(3));
        store.backdate(stale.id, today.created_at - Duration::days(30));

        let timeline = store.analytics().await.unwrap().timeline;

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].date, today.created_at.date_naive());
        assert_eq!(
            timeline[1].date,
            (today.created_at - Duration::days(3)).date_naive()
        );
        assert!(timeline.iter().all(|t| t.count == 1));
    }
}
