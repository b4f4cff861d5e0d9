//! Storage backends.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod text;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{DatabaseStats, PostgresStore};

use crate::types::search::ScoredPlaybook;

/// Best score first, equal scores by id ascending, cut to `limit`.
pub(crate) fn ranked(mut rows: Vec<ScoredPlaybook>, limit: usize) -> Vec<ScoredPlaybook> {
    rows.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
    rows.truncate(limit);
    rows
}
