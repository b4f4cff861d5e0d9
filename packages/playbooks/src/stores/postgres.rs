//! PostgreSQL storage implementation.
//!
//! Three indexing modalities over the same `playbooks` table:
//!
//! - **Fuzzy**: `pg_trgm` GIN index, queried through `search_playbooks_fuzzy`
//! - **Full-text**: generated `search_vector` column, queried through
//!   `search_playbooks_fulltext`
//! - **Semantic**: pgvector HNSW index with cosine distance (`<=>`)
//!
//! `steps` and `common_failures` are JSONB and cross this boundary once,
//! as typed values, via `sqlx::types::Json`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pgvector::Vector;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use super::ranked;
use crate::error::{PlaybookError, Result};
use crate::traits::store::{AnalyticsStore, DocumentStore, FeedbackStore, PlaybookStore};
use crate::types::{
    analytics::{Analytics, FailureCount, FeedbackStats, Overview, StepCount, TimelinePoint},
    config::PoolConfig,
    document::{Document, NewDocument},
    feedback::{Feedback, NewFeedback},
    id::{DocumentId, FeedbackId, PlaybookId},
    playbook::{CommonFailure, NewPlaybook, Playbook, PlaybookStep, PlaybookView},
    search::ScoredPlaybook,
};

const PLAYBOOK_VIEW_COLUMNS: &str =
    "id, task_name, steps, common_failures, confidence_score, created_at, view_count";

/// PostgreSQL-backed store for documents, playbooks and feedback.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect with a bounded pool.
    ///
    /// `statement_timeout` is set as a session option on every connection so
    /// a wedged query is cancelled server-side and its connection released.
    pub async fn connect(database_url: &str, config: &PoolConfig) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)?.options([(
            "statement_timeout",
            config.statement_timeout.as_millis().to_string(),
        )]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await?;

        info!(
            max_connections = config.max_connections,
            statement_timeout_ms = config.statement_timeout.as_millis() as u64,
            "Connected to Postgres"
        );

        Ok(Self::from_pool(pool))
    }

    /// Wrap a pool owned by the caller (the server's composition root).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded migrations (extensions, tables, indexes, search functions).
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(PlaybookError::persistence)?;
        info!("Playbook migrations applied");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Extensions, indexes, table sizes and search readiness.
    #[instrument(skip(self))]
    pub async fn database_stats(&self) -> Result<DatabaseStats> {
        let database = sqlx::query_as::<_, DatabaseInfo>(
            r#"
            SELECT current_database()::TEXT AS name,
                   pg_size_pretty(pg_database_size(current_database())) AS size,
                   (SELECT COUNT(*) FROM pg_stat_activity WHERE datname = current_database())
                       AS active_connections
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let extensions = sqlx::query_as::<_, ExtensionInfo>(
            r#"
            SELECT extname::TEXT AS name, extversion AS version
            FROM pg_extension
            WHERE extname IN ('vector', 'pg_trgm')
            ORDER BY extname
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let indexes = sqlx::query_as::<_, IndexInfo>(
            r#"
            SELECT i.indexname::TEXT AS name,
                   i.tablename::TEXT AS table_name,
                   i.indexdef AS definition,
                   pg_size_pretty(pg_relation_size(c.oid)) AS size
            FROM pg_indexes i
            JOIN pg_class c ON c.relname = i.indexname
            WHERE i.schemaname = current_schema()
              AND i.tablename IN ('documents', 'playbooks', 'feedback')
            ORDER BY i.tablename, i.indexname
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let tables = sqlx::query_as::<_, TableSize>(
            r#"
            SELECT c.relname::TEXT AS table_name,
                   pg_size_pretty(pg_total_relation_size(c.oid)) AS total_size,
                   pg_size_pretty(pg_relation_size(c.oid)) AS table_size,
                   pg_size_pretty(pg_indexes_size(c.oid)) AS indexes_size
            FROM pg_class c
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = current_schema()
              AND c.relkind = 'r'
              AND c.relname IN ('documents', 'playbooks', 'feedback')
            ORDER BY pg_total_relation_size(c.oid) DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let search = sqlx::query_as::<_, SearchReadiness>(
            r#"
            SELECT COUNT(*) AS total_playbooks,
                   COUNT(*) FILTER (WHERE search_vector IS NOT NULL
                                      AND search_vector <> ''::tsvector) AS fulltext_ready,
                   COUNT(*) FILTER (WHERE embedding IS NOT NULL) AS semantic_ready,
                   AVG(confidence_score)::DOUBLE PRECISION AS avg_confidence
            FROM playbooks
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DatabaseStats {
            database,
            extensions,
            indexes,
            tables,
            search,
        })
    }
}

/// Snapshot of database health for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub database: DatabaseInfo,
    pub extensions: Vec<ExtensionInfo>,
    pub indexes: Vec<IndexInfo>,
    pub tables: Vec<TableSize>,
    pub search: SearchReadiness,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DatabaseInfo {
    pub name: String,
    pub size: String,
    pub active_connections: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExtensionInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IndexInfo {
    pub name: String,
    pub table_name: String,
    pub definition: String,
    pub size: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TableSize {
    pub table_name: String,
    pub total_size: String,
    pub table_size: String,
    pub indexes_size: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SearchReadiness {
    pub total_playbooks: i64,
    pub fulltext_ready: i64,
    pub semantic_ready: i64,
    pub avg_confidence: Option<f64>,
}

// =============================================================================
// Row types
// =============================================================================

#[derive(FromRow)]
struct DocumentRow {
    id: i64,
    source: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: DocumentId(row.id),
            source: row.source,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct PlaybookRow {
    id: i64,
    task_name: String,
    steps: Json<Vec<PlaybookStep>>,
    common_failures: Json<Vec<CommonFailure>>,
    embedding: Option<Vector>,
    confidence_score: f64,
    view_count: i64,
    created_at: DateTime<Utc>,
}

impl From<PlaybookRow> for Playbook {
    fn from(row: PlaybookRow) -> Self {
        Self {
            id: PlaybookId(row.id),
            task_name: row.task_name,
            steps: row.steps.0,
            common_failures: row.common_failures.0,
            embedding: row.embedding.map(|v| v.to_vec()),
            confidence_score: row.confidence_score,
            view_count: row.view_count,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct PlaybookViewRow {
    id: i64,
    task_name: String,
    steps: Json<Vec<PlaybookStep>>,
    common_failures: Json<Vec<CommonFailure>>,
    confidence_score: f64,
    created_at: DateTime<Utc>,
    view_count: i64,
}

impl From<PlaybookViewRow> for PlaybookView {
    fn from(row: PlaybookViewRow) -> Self {
        Self {
            id: PlaybookId(row.id),
            task_name: row.task_name,
            steps: row.steps.0,
            common_failures: row.common_failures.0,
            confidence_score: row.confidence_score,
            created_at: row.created_at,
            view_count: row.view_count,
        }
    }
}

#[derive(FromRow)]
struct ScoredRow {
    id: i64,
    task_name: String,
    score: f64,
}

impl From<ScoredRow> for ScoredPlaybook {
    fn from(row: ScoredRow) -> Self {
        ScoredPlaybook::new(row.id, row.task_name, row.score)
    }
}

#[derive(FromRow)]
struct FeedbackRow {
    id: i64,
    playbook_id: i64,
    user_query: String,
    was_helpful: bool,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: FeedbackId(row.id),
            playbook_id: PlaybookId(row.playbook_id),
            user_query: row.user_query,
            was_helpful: row.was_helpful,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

fn sql_limit(limit: usize) -> i32 {
    i32::try_from(limit).unwrap_or(i32::MAX)
}

// =============================================================================
// Trait implementations
// =============================================================================

#[async_trait]
impl DocumentStore for PostgresStore {
    #[instrument(skip(self))]
    async fn list_documents(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, source, content, created_at FROM documents ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn get_documents(&self, ids: &[DocumentId]) -> Result<Vec<Document>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, source, content, created_at FROM documents WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn insert_document(&self, document: &NewDocument) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (source, content)
            VALUES ($1, $2)
            RETURNING id, source, content, created_at
            "#,
        )
        .bind(&document.source)
        .bind(&document.content)
        .fetch_one(&self.pool)
        .await?;
        debug!(document_id = row.id, source = %row.source, "Inserted document");
        Ok(row.into())
    }

    async fn count_documents(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl PlaybookStore for PostgresStore {
    #[instrument(skip(self, playbook), fields(task_name = %playbook.task_name))]
    async fn insert_playbook(&self, playbook: &NewPlaybook) -> Result<Playbook> {
        let row = sqlx::query_as::<_, PlaybookRow>(
            r#"
            INSERT INTO playbooks (task_name, steps, common_failures, embedding, confidence_score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, task_name, steps, common_failures, embedding,
                      confidence_score, view_count, created_at
            "#,
        )
        .bind(&playbook.task_name)
        .bind(Json(&playbook.steps))
        .bind(Json(&playbook.common_failures))
        .bind(Vector::from(playbook.embedding.clone()))
        .bind(playbook.confidence_score)
        .fetch_one(&self.pool)
        .await?;
        debug!(playbook_id = row.id, "Inserted playbook");
        Ok(row.into())
    }

    async fn get_playbook(&self, id: PlaybookId) -> Result<Option<PlaybookView>> {
        let row = sqlx::query_as::<_, PlaybookViewRow>(&format!(
            "SELECT {} FROM playbooks WHERE id = $1",
            PLAYBOOK_VIEW_COLUMNS
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PlaybookView::from))
    }

    async fn get_playbooks(&self, ids: &[PlaybookId]) -> Result<Vec<PlaybookView>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query_as::<_, PlaybookViewRow>(&format!(
            "SELECT {} FROM playbooks WHERE id = ANY($1)",
            PLAYBOOK_VIEW_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PlaybookView::from).collect())
    }

    async fn list_playbooks(&self, limit: i64, offset: i64) -> Result<Vec<PlaybookView>> {
        let rows = sqlx::query_as::<_, PlaybookViewRow>(&format!(
            "SELECT {} FROM playbooks ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            PLAYBOOK_VIEW_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PlaybookView::from).collect())
    }

    async fn count_playbooks(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playbooks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn search_fuzzy(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        let rows = sqlx::query_as::<_, ScoredRow>(
            "SELECT id, task_name, score FROM search_playbooks_fuzzy($1, $2)",
        )
        .bind(query)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        debug!(results = rows.len(), "Fuzzy search");
        Ok(rows.into_iter().map(ScoredPlaybook::from).collect())
    }

    #[instrument(skip(self))]
    async fn search_fulltext(&self, query: &str, limit: usize) -> Result<Vec<ScoredPlaybook>> {
        let rows = sqlx::query_as::<_, ScoredRow>(
            "SELECT id, task_name, score FROM search_playbooks_fulltext($1, $2)",
        )
        .bind(query)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        debug!(results = rows.len(), "Full-text search");
        Ok(rows.into_iter().map(ScoredPlaybook::from).collect())
    }

    #[instrument(skip(self, embedding), fields(dimensions = embedding.len()))]
    async fn search_semantic(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPlaybook>> {
        let rows = sqlx::query_as::<_, ScoredRow>(
            r#"
            SELECT id, task_name, (1 - (embedding <=> $1))::DOUBLE PRECISION AS score
            FROM playbooks
            WHERE embedding IS NOT NULL
            ORDER BY embedding <=> $1
            LIMIT $2
            "#,
        )
        .bind(Vector::from(embedding.to_vec()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        debug!(results = rows.len(), "Semantic search");
        // Distance alone keeps the HNSW scan; ties are ordered here.
        Ok(ranked(rows.into_iter().map(ScoredPlaybook::from).collect(), limit))
    }
}

#[async_trait]
impl FeedbackStore for PostgresStore {
    #[instrument(skip(self, feedback), fields(playbook_id = %feedback.playbook_id))]
    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<Feedback> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            r#"
            INSERT INTO feedback (playbook_id, user_query, was_helpful, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, playbook_id, user_query, was_helpful, comment, created_at
            "#,
        )
        .bind(feedback.playbook_id.get())
        .bind(&feedback.user_query)
        .bind(feedback.was_helpful)
        .bind(&feedback.comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_feedback_for(&self, playbook_id: PlaybookId) -> Result<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, playbook_id, user_query, was_helpful, comment, created_at
            FROM feedback
            WHERE playbook_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(playbook_id.get())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }
}

#[async_trait]
impl AnalyticsStore for PostgresStore {
    #[instrument(skip(self))]
    async fn analytics(&self) -> Result<Analytics> {
        let (documents, playbooks, feedback, avg_steps): (i64, i64, i64, f64) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM documents),
                   (SELECT COUNT(*) FROM playbooks),
                   (SELECT COUNT(*) FROM feedback),
                   (SELECT COALESCE(AVG(jsonb_array_length(steps)), 0)::DOUBLE PRECISION
                    FROM playbooks)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let timeline: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT created_at::DATE AS date, COUNT(*) AS count
            FROM playbooks
            WHERE created_at >= NOW() - INTERVAL '7 days'
            GROUP BY 1
            ORDER BY 1 DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let failures: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT f->>'issue' AS issue, COUNT(*) AS count
            FROM playbooks, jsonb_array_elements(common_failures) AS f
            WHERE f->>'issue' IS NOT NULL
            GROUP BY 1
            ORDER BY 2 DESC, 1
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let (helpful, not_helpful): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE was_helpful),
                   COUNT(*) FILTER (WHERE NOT was_helpful)
            FROM feedback
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let top: Vec<(i64, String, i64)> = sqlx::query_as(
            r#"
            SELECT id, task_name, jsonb_array_length(steps)::BIGINT AS step_count
            FROM playbooks
            ORDER BY 3 DESC, id
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Analytics {
            overview: Overview {
                documents,
                playbooks,
                feedback,
                avg_steps,
            },
            timeline: timeline
                .into_iter()
                .map(|(date, count)| TimelinePoint { date, count })
                .collect(),
            common_failures: failures
                .into_iter()
                .map(|(issue, count)| FailureCount { issue, count })
                .collect(),
            feedback: FeedbackStats::new(helpful, not_helpful),
            top_playbooks: top
                .into_iter()
                .map(|(id, task_name, step_count)| StepCount {
                    id: PlaybookId(id),
                    task_name,
                    step_count,
                })
                .collect(),
        })
    }
}
