//! # Core Ports
//!
//! Interface boundaries to the two external collaborators: the transactional
//! record store and the caller-identity resolver. Adapters implement these
//! traits; the service layer depends only on them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Answer, Comment, Post, UserRef};

/// A resolved caller identity. The core never sees raw credentials.
pub type CallerId = Uuid;

/// Resolves an opaque credential (e.g. a bearer token) to a caller identity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the verified caller id, or [`crate::AppError::Unauthorized`].
    async fn resolve(&self, credential: &str) -> Result<CallerId>;
}

/// A single mutation inside a [`WriteBatch`].
///
/// Versioning contract: every `Put` carries the `version` the writer read
/// (0 for a fresh insert). The store persists the record with `version + 1`
/// and fails the whole batch with `Conflict` on any mismatch, so lost
/// updates are impossible. `Delete`s of absent records are no-ops, which
/// keeps cascade steps safe to retry.
#[derive(Debug, Clone)]
pub enum WriteOp {
    PutPost(Post),
    PutAnswer(Answer),
    PutComment(Comment),
    PutUser(UserRef),
    DeletePost(Uuid),
    DeleteAnswer(Uuid),
    DeleteComment(Uuid),
}

/// An ordered set of mutations executed atomically as one unit of work.
/// Either every op applies or none does; there is no partial cascade.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_post(mut self, post: Post) -> Self {
        self.ops.push(WriteOp::PutPost(post));
        self
    }

    pub fn put_answer(mut self, answer: Answer) -> Self {
        self.ops.push(WriteOp::PutAnswer(answer));
        self
    }

    pub fn put_comment(mut self, comment: Comment) -> Self {
        self.ops.push(WriteOp::PutComment(comment));
        self
    }

    pub fn put_user(mut self, user: UserRef) -> Self {
        self.ops.push(WriteOp::PutUser(user));
        self
    }

    pub fn delete_post(mut self, id: Uuid) -> Self {
        self.ops.push(WriteOp::DeletePost(id));
        self
    }

    pub fn delete_answer(mut self, id: Uuid) -> Self {
        self.ops.push(WriteOp::DeleteAnswer(id));
        self
    }

    pub fn delete_comment(mut self, id: Uuid) -> Self {
        self.ops.push(WriteOp::DeleteComment(id));
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Data persistence contract for posts, answers, comments, and the user
/// directory.
///
/// All listing methods return records newest-first. Adapters surface
/// transient failures as `StoreUnavailable` and version mismatches as
/// `Conflict`; they never enforce domain rules beyond the versioning
/// contract on [`WriteOp`].
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ForumStore: Send + Sync {
    // Post operations
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn list_posts(&self) -> Result<Vec<Post>>;

    // Answer operations
    async fn get_answer(&self, id: Uuid) -> Result<Option<Answer>>;
    async fn answers_by_post(&self, post_id: Uuid) -> Result<Vec<Answer>>;

    // Comment operations
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn list_comments(&self) -> Result<Vec<Comment>>;
    async fn comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;
    async fn comments_by_answer(&self, answer_id: Uuid) -> Result<Vec<Comment>>;
    async fn comments_by_author(&self, author: Uuid) -> Result<Vec<Comment>>;

    // User directory (read-side display fields)
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRef>>;
    async fn users_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<UserRef>>;

    /// Applies a batch atomically. See [`WriteOp`] for the versioning
    /// contract.
    async fn apply(&self, batch: WriteBatch) -> Result<()>;
}
