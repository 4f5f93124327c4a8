//! Content graph: entity creation, parent-link validation, edits, and
//! dependency-ordered cascade deletion.
//!
//! Cascades are built as one leaf-first [`WriteBatch`] and applied as a
//! single atomic unit of work, so a failure leaves no partial cascade and a
//! retry of an already-deleted parent is a no-op.

use chrono::Utc;
use domains::{
    Answer, AppError, CallerId, Comment, CommentKind, CommentParent, Post, Result, WriteBatch,
};
use serde::Serialize;
use uuid::Uuid;

use crate::moderation;
use crate::Forum;

/// Fields of a comment its author may change in one edit request.
#[derive(Debug, Clone, Default)]
pub struct CommentEdit {
    pub content: Option<String>,
    pub status: Option<String>,
    pub mentions: Option<Vec<String>>,
}

/// What a cascade delete removed. `deleted == false` means the parent was
/// already gone and the whole operation was a no-op.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeReport {
    pub deleted: bool,
    pub answers: usize,
    pub comments: usize,
}

impl CascadeReport {
    fn already_absent() -> Self {
        Self { deleted: false, answers: 0, comments: 0 }
    }
}

impl Forum {
    // ── Posts ────────────────────────────────────────────────────────────

    pub async fn create_post(
        &self,
        author: CallerId,
        title: String,
        content: String,
        tags: Vec<String>,
    ) -> Result<Post> {
        let post = Post::new(author, title, content, tags)?;
        self.store().apply(WriteBatch::new().put_post(post.clone())).await?;
        tracing::info!(post_id = %post.id, %author, "post created");
        Ok(post)
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.store().list_posts().await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post> {
        self.store()
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post", id.to_string()))
    }

    /// Deletes a post and everything that references it, directly or
    /// transitively: comments on its answers, comments on the post, the
    /// answers, then the post itself — one atomic batch, leaf-first.
    ///
    /// The authorization check runs before any deletion is planned, so an
    /// unauthorized request never produces a partial cascade. An absent
    /// post is a no-op, which makes retries safe.
    pub async fn delete_post(&self, post_id: Uuid, requester: CallerId) -> Result<CascadeReport> {
        let Some(post) = self.store().get_post(post_id).await? else {
            tracing::debug!(%post_id, "delete_post on absent post, no-op");
            return Ok(CascadeReport::already_absent());
        };
        if post.author != requester {
            return Err(AppError::Forbidden(
                "only the post author can delete this post".into(),
            ));
        }

        let answers = self.store().answers_by_post(post_id).await?;
        let mut batch = WriteBatch::new();
        let mut comments = 0;
        for answer in &answers {
            for comment in self.store().comments_by_answer(answer.id).await? {
                batch = batch.delete_comment(comment.id);
                comments += 1;
            }
        }
        for comment in self.store().comments_by_post(post_id).await? {
            batch = batch.delete_comment(comment.id);
            comments += 1;
        }
        for answer in &answers {
            batch = batch.delete_answer(answer.id);
        }
        batch = batch.delete_post(post_id);

        self.store().apply(batch).await?;
        tracing::info!(%post_id, answers = answers.len(), comments, "post cascade deleted");
        Ok(CascadeReport { deleted: true, answers: answers.len(), comments })
    }

    // ── Answers ──────────────────────────────────────────────────────────

    /// Creates an answer under an existing post.
    pub async fn create_answer(
        &self,
        post_id: Uuid,
        author: CallerId,
        body: String,
    ) -> Result<Answer> {
        if self.store().get_post(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post", post_id.to_string()));
        }
        let answer = Answer::new(author, post_id, body)?;
        self.store().apply(WriteBatch::new().put_answer(answer.clone())).await?;
        tracing::info!(answer_id = %answer.id, %post_id, %author, "answer created");
        Ok(answer)
    }

    /// Answers under a post, newest first.
    pub async fn answers_for_post(&self, post_id: Uuid) -> Result<Vec<Answer>> {
        self.store().answers_by_post(post_id).await
    }

    pub async fn edit_answer(
        &self,
        answer_id: Uuid,
        requester: CallerId,
        body: String,
    ) -> Result<Answer> {
        let mut answer = self
            .store()
            .get_answer(answer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Answer", answer_id.to_string()))?;
        if answer.author != requester {
            return Err(AppError::Forbidden(
                "only the answer author can edit this answer".into(),
            ));
        }
        if body.trim().is_empty() {
            return Err(AppError::Validation("answer body must not be empty".into()));
        }
        answer.body = body;
        answer.updated_at = Utc::now();
        self.store().apply(WriteBatch::new().put_answer(answer.clone())).await?;
        Ok(answer)
    }

    /// Deletes an answer and its dependent comments in one atomic batch.
    /// Idempotent like [`Forum::delete_post`].
    pub async fn delete_answer(
        &self,
        answer_id: Uuid,
        requester: CallerId,
    ) -> Result<CascadeReport> {
        let Some(answer) = self.store().get_answer(answer_id).await? else {
            tracing::debug!(%answer_id, "delete_answer on absent answer, no-op");
            return Ok(CascadeReport::already_absent());
        };
        if answer.author != requester {
            return Err(AppError::Forbidden(
                "only the answer author can delete this answer".into(),
            ));
        }

        let mut batch = WriteBatch::new();
        let mut comments = 0;
        for comment in self.store().comments_by_answer(answer_id).await? {
            batch = batch.delete_comment(comment.id);
            comments += 1;
        }
        batch = batch.delete_answer(answer_id);

        self.store().apply(batch).await?;
        tracing::info!(%answer_id, comments, "answer cascade deleted");
        Ok(CascadeReport { deleted: true, answers: 1, comments })
    }

    // ── Comments ─────────────────────────────────────────────────────────

    /// Creates a comment under exactly one existing post or answer. The
    /// parent type rules out "both"/"neither" structurally; this validates
    /// that the referenced entity actually exists.
    pub async fn create_comment(
        &self,
        author: CallerId,
        parent: CommentParent,
        content: &str,
        kind: CommentKind,
        mentions: Vec<String>,
    ) -> Result<Comment> {
        match parent {
            CommentParent::Post(id) => {
                if self.store().get_post(id).await?.is_none() {
                    return Err(AppError::InvalidReference(format!(
                        "parent post {id} does not exist"
                    )));
                }
            }
            CommentParent::Answer(id) => {
                if self.store().get_answer(id).await?.is_none() {
                    return Err(AppError::InvalidReference(format!(
                        "parent answer {id} does not exist"
                    )));
                }
            }
        }
        let comment = Comment::new(author, parent, content, kind, mentions)?;
        self.store().apply(WriteBatch::new().put_comment(comment.clone())).await?;
        tracing::info!(comment_id = %comment.id, %author, ?parent, "comment created");
        Ok(comment)
    }

    /// Applies an author-only edit. A content change goes through the
    /// moderation log (edit history + `is_edited`); status is normalized
    /// to lowercase on write.
    pub async fn edit_comment(
        &self,
        comment_id: Uuid,
        requester: CallerId,
        edit: CommentEdit,
    ) -> Result<Comment> {
        let mut comment = self
            .store()
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment", comment_id.to_string()))?;
        if comment.author != requester {
            return Err(AppError::Forbidden(
                "only the comment author can edit this comment".into(),
            ));
        }

        if let Some(content) = edit.content {
            let content = Comment::validate_content(&content)?;
            moderation::record_edit(&mut comment, content, Utc::now());
        }
        if let Some(status) = edit.status {
            comment.status = moderation::normalize_status(&status);
            comment.updated_at = Utc::now();
        }
        if let Some(mentions) = edit.mentions {
            comment.mentions = mentions;
            comment.updated_at = Utc::now();
        }

        self.store().apply(WriteBatch::new().put_comment(comment.clone())).await?;
        Ok(comment)
    }

    /// Comments are leaves: no cascade, author-only.
    pub async fn delete_comment(&self, comment_id: Uuid, requester: CallerId) -> Result<()> {
        let comment = self
            .store()
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment", comment_id.to_string()))?;
        if comment.author != requester {
            return Err(AppError::Forbidden(
                "only the comment author can delete this comment".into(),
            ));
        }
        self.store()
            .apply(WriteBatch::new().delete_comment(comment_id))
            .await?;
        tracing::info!(%comment_id, "comment deleted");
        Ok(())
    }

    pub async fn list_comments(&self) -> Result<Vec<Comment>> {
        self.store().list_comments().await
    }

    pub async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.store().comments_by_post(post_id).await
    }

    pub async fn comments_for_answer(&self, answer_id: Uuid) -> Result<Vec<Comment>> {
        self.store().comments_by_answer(answer_id).await
    }

    pub async fn comments_by_author(&self, author: Uuid) -> Result<Vec<Comment>> {
        self.store().comments_by_author(author).await
    }
}
