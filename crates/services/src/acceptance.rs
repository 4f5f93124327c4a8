//! Answer acceptance: the "at most one accepted answer per post" rule.
//!
//! The flip and the sibling clear go into the same [`WriteBatch`], so the
//! only reachable post-level states are "unaccepted" and
//! "exactly-one-accepted".

use domains::{AppError, CallerId, Result, WriteBatch};
use serde::Serialize;
use uuid::Uuid;

use crate::Forum;

/// Result of an acceptance toggle.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptReceipt {
    pub answer_id: Uuid,
    /// true: the target is now the post's single accepted answer.
    /// false: the target was already accepted and is now cleared.
    pub accepted: bool,
}

impl Forum {
    /// Toggles acceptance of an answer. Only the parent post's author may
    /// accept; every sibling is force-cleared in the same atomic batch.
    pub async fn toggle_accept_answer(
        &self,
        answer_id: Uuid,
        requester: CallerId,
    ) -> Result<AcceptReceipt> {
        let mut answer = self
            .store()
            .get_answer(answer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Answer", answer_id.to_string()))?;
        let post = self
            .store()
            .get_post(answer.post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post", answer.post_id.to_string()))?;
        if post.author != requester {
            return Err(AppError::Forbidden(
                "only the post author can accept answers".into(),
            ));
        }

        let mut batch = WriteBatch::new();
        for mut sibling in self.store().answers_by_post(post.id).await? {
            if sibling.id != answer.id && sibling.accepted {
                sibling.accepted = false;
                batch = batch.put_answer(sibling);
            }
        }
        answer.accepted = !answer.accepted;
        let accepted = answer.accepted;
        batch = batch.put_answer(answer);

        self.store().apply(batch).await?;
        tracing::info!(%answer_id, accepted, "answer acceptance toggled");
        Ok(AcceptReceipt { answer_id, accepted })
    }
}
