//! Core trait abstractions.
//!
//! These traits define the seams between the pipeline and its collaborators:
//! model endpoints (`AI`) and storage (`Store` and its parts).

pub mod ai;
pub mod store;
