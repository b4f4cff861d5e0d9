//! Feedback submission.

use tracing::instrument;

use crate::error::{PlaybookError, Result};
use crate::traits::store::FeedbackStore;
use crate::types::feedback::{Feedback, NewFeedback};

/// Record a user's verdict on a playbook.
///
/// The playbook id is only checked for shape. Feedback is a weak reference
/// and is accepted for ids that have no playbook.
#[instrument(skip(store, feedback), fields(playbook_id = %feedback.playbook_id, was_helpful = feedback.was_helpful))]
pub async fn submit_feedback<S: FeedbackStore + ?Sized>(
    store: &S,
    feedback: &NewFeedback,
) -> Result<Feedback> {
    if feedback.playbook_id.get() <= 0 {
        return Err(PlaybookError::Validation(
            "playbook_id must be a positive integer".into(),
        ));
    }
    store.insert_feedback(feedback).await
}
