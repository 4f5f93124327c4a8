//! Vote application for posts, answers, and comments.
//!
//! The toggle/flip state machine itself lives on
//! [`domains::VoteLedger`]; this module adds the per-entity-kind direction
//! policy and the versioned read-modify-write loop that keeps concurrent
//! voters from losing updates.

use domains::{
    Answer, AppError, CallerId, Comment, Post, Result, VoteDirection, VoteLedger, VoteOutcome,
    VotePolicy, WriteBatch,
};
use serde::Serialize;
use uuid::Uuid;

use crate::Forum;

/// How many times a vote is re-applied after a version conflict before the
/// conflict is surfaced to the caller.
const MAX_VOTE_RETRIES: usize = 3;

/// The result of applying a vote: what happened, plus counts recomputed
/// from the updated ledger. Counts are always derived, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct VoteReceipt {
    pub outcome: VoteOutcome,
    pub upvotes: usize,
    pub downvotes: usize,
    pub score: i64,
}

impl VoteReceipt {
    fn new(outcome: VoteOutcome, ledger: &VoteLedger) -> Self {
        Self {
            outcome,
            upvotes: ledger.upvotes(),
            downvotes: ledger.downvotes(),
            score: ledger.score(),
        }
    }
}

fn ensure_direction(policy: VotePolicy, direction: VoteDirection, target: &str) -> Result<()> {
    if policy.allows(direction) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "direction {} is not allowed on a {target}",
            i8::from(direction)
        )))
    }
}

impl Forum {
    /// Applies `direction` from `voter` to a post's ledger.
    pub async fn vote_post(
        &self,
        post_id: Uuid,
        voter: CallerId,
        direction: VoteDirection,
    ) -> Result<VoteReceipt> {
        ensure_direction(Post::VOTE_POLICY, direction, "post")?;

        let mut attempt = 0;
        loop {
            let mut post = self
                .store()
                .get_post(post_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Post", post_id.to_string()))?;

            let outcome = post.votes.apply(voter, direction);
            let receipt = VoteReceipt::new(outcome, &post.votes);

            match self.store().apply(WriteBatch::new().put_post(post)).await {
                Ok(()) => {
                    tracing::info!(%post_id, %voter, ?outcome, score = receipt.score, "post vote applied");
                    return Ok(receipt);
                }
                Err(AppError::Conflict(_)) if attempt + 1 < MAX_VOTE_RETRIES => {
                    attempt += 1;
                    tracing::warn!(%post_id, %voter, attempt, "post vote conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Applies `direction` from `voter` to an answer's ledger.
    pub async fn vote_answer(
        &self,
        answer_id: Uuid,
        voter: CallerId,
        direction: VoteDirection,
    ) -> Result<VoteReceipt> {
        ensure_direction(Answer::VOTE_POLICY, direction, "answer")?;

        let mut attempt = 0;
        loop {
            let mut answer = self
                .store()
                .get_answer(answer_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Answer", answer_id.to_string()))?;

            let outcome = answer.votes.apply(voter, direction);
            let receipt = VoteReceipt::new(outcome, &answer.votes);

            match self.store().apply(WriteBatch::new().put_answer(answer)).await {
                Ok(()) => {
                    tracing::info!(%answer_id, %voter, ?outcome, score = receipt.score, "answer vote applied");
                    return Ok(receipt);
                }
                Err(AppError::Conflict(_)) if attempt + 1 < MAX_VOTE_RETRIES => {
                    attempt += 1;
                    tracing::warn!(%answer_id, %voter, attempt, "answer vote conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Applies `direction` from `voter` to a comment's ledger. Comments are
    /// upvote-only; a downvote fails validation before any read.
    pub async fn vote_comment(
        &self,
        comment_id: Uuid,
        voter: CallerId,
        direction: VoteDirection,
    ) -> Result<VoteReceipt> {
        ensure_direction(Comment::VOTE_POLICY, direction, "comment")?;

        let mut attempt = 0;
        loop {
            let mut comment = self
                .store()
                .get_comment(comment_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Comment", comment_id.to_string()))?;

            let outcome = comment.votes.apply(voter, direction);
            let receipt = VoteReceipt::new(outcome, &comment.votes);

            match self.store().apply(WriteBatch::new().put_comment(comment)).await {
                Ok(()) => {
                    tracing::info!(%comment_id, %voter, ?outcome, score = receipt.score, "comment vote applied");
                    return Ok(receipt);
                }
                Err(AppError::Conflict(_)) if attempt + 1 < MAX_VOTE_RETRIES => {
                    attempt += 1;
                    tracing::warn!(%comment_id, %voter, attempt, "comment vote conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Convenience wrapper for the comment upvote endpoint.
    pub async fn upvote_comment(&self, comment_id: Uuid, voter: CallerId) -> Result<VoteReceipt> {
        self.vote_comment(comment_id, voter, VoteDirection::Up).await
    }
}
