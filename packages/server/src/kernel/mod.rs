//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod telemetry;

pub use deps::{build_openai, ServerDeps};
pub use telemetry::init_tracing;
