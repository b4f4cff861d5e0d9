//! Domain types for documents, playbooks, feedback and search.

pub mod analytics;
pub mod config;
pub mod document;
pub mod feedback;
pub mod id;
pub mod playbook;
pub mod report;
pub mod search;
