//! Collection-wide statistics.

use chrono::NaiveDate;
use serde::Serialize;

use super::id::PlaybookId;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub overview: Overview,
    /// Playbooks created per day over the last 7 days, newest first
    pub timeline: Vec<TimelinePoint>,
    /// Most frequent failure issues (top 10)
    pub common_failures: Vec<FailureCount>,
    pub feedback: FeedbackStats,
    /// Playbooks with the most steps (top 5)
    pub top_playbooks: Vec<StepCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub documents: i64,
    pub playbooks: i64,
    pub feedback: i64,
    pub avg_steps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureCount {
    pub issue: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackStats {
    pub helpful: i64,
    pub not_helpful: i64,
    pub total: i64,
    /// Rounded percentage of helpful votes
    pub helpful_rate: i64,
}

impl FeedbackStats {
    pub fn new(helpful: i64, not_helpful: i64) -> Self {
        let total = helpful + not_helpful;
        let helpful_rate = if total > 0 {
            ((helpful as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        };
        Self {
            helpful,
            not_helpful,
            total,
            helpful_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepCount {
    pub id: PlaybookId,
    pub task_name: String,
    pub step_count: i64,
}
