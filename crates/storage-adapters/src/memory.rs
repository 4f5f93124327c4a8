//! In-memory `ForumStore` backed by a single `tokio::sync::RwLock`.
//!
//! The one write lock gives every [`WriteBatch`] multi-record atomicity:
//! versions are validated for the whole batch before anything mutates, so a
//! conflicting batch leaves the tables untouched.

use std::collections::HashMap;

use async_trait::async_trait;
use domains::{
    Answer, AppError, Comment, CommentParent, ForumStore, Post, Result, UserRef, WriteBatch,
    WriteOp,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    posts: HashMap<Uuid, Post>,
    answers: HashMap<Uuid, Answer>,
    comments: HashMap<Uuid, Comment>,
    users: HashMap<Uuid, UserRef>,
}

/// Reference store implementation; also the default for `cmd/askforge`
/// when no database feature is enabled.
#[derive(Default)]
pub struct MemoryForumStore {
    tables: RwLock<Tables>,
}

impl MemoryForumStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version(stored: Option<u64>, incoming: u64, entity: &str, id: Uuid) -> Result<()> {
    match (stored, incoming) {
        (None, 0) => Ok(()),
        (Some(v), w) if v == w => Ok(()),
        (stored, _) => Err(AppError::Conflict(format!(
            "{entity} {id}: version {incoming} does not match stored {stored:?}"
        ))),
    }
}

#[async_trait]
impl ForumStore for MemoryForumStore {
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn get_answer(&self, id: Uuid) -> Result<Option<Answer>> {
        Ok(self.tables.read().await.answers.get(&id).cloned())
    }

    async fn answers_by_post(&self, post_id: Uuid) -> Result<Vec<Answer>> {
        let tables = self.tables.read().await;
        let mut answers: Vec<Answer> = tables
            .answers
            .values()
            .filter(|a| a.post_id == post_id)
            .cloned()
            .collect();
        answers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(answers)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self) -> Result<Vec<Comment>> {
        self.filtered_comments(|_| true).await
    }

    async fn comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.filtered_comments(move |c| c.parent == CommentParent::Post(post_id))
            .await
    }

    async fn comments_by_answer(&self, answer_id: Uuid) -> Result<Vec<Comment>> {
        self.filtered_comments(move |c| c.parent == CommentParent::Answer(answer_id))
            .await
    }

    async fn comments_by_author(&self, author: Uuid) -> Result<Vec<Comment>> {
        self.filtered_comments(move |c| c.author == author).await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRef>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn users_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<UserRef>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut tables = self.tables.write().await;

        // Validate the whole batch against current versions before any
        // mutation; a conflicting batch must leave the tables untouched.
        for op in &batch.ops {
            match op {
                WriteOp::PutPost(p) => check_version(
                    tables.posts.get(&p.id).map(|e| e.version),
                    p.version,
                    "Post",
                    p.id,
                )?,
                WriteOp::PutAnswer(a) => check_version(
                    tables.answers.get(&a.id).map(|e| e.version),
                    a.version,
                    "Answer",
                    a.id,
                )?,
                WriteOp::PutComment(c) => check_version(
                    tables.comments.get(&c.id).map(|e| e.version),
                    c.version,
                    "Comment",
                    c.id,
                )?,
                WriteOp::PutUser(u) => check_version(
                    tables.users.get(&u.id).map(|e| e.version),
                    u.version,
                    "User",
                    u.id,
                )?,
                // Deletes of absent records are no-ops by contract.
                WriteOp::DeletePost(_) | WriteOp::DeleteAnswer(_) | WriteOp::DeleteComment(_) => {}
            }
        }

        for op in batch.ops {
            match op {
                WriteOp::PutPost(mut p) => {
                    p.version += 1;
                    tables.posts.insert(p.id, p);
                }
                WriteOp::PutAnswer(mut a) => {
                    a.version += 1;
                    tables.answers.insert(a.id, a);
                }
                WriteOp::PutComment(mut c) => {
                    c.version += 1;
                    tables.comments.insert(c.id, c);
                }
                WriteOp::PutUser(mut u) => {
                    u.version += 1;
                    tables.users.insert(u.id, u);
                }
                WriteOp::DeletePost(id) => {
                    tables.posts.remove(&id);
                }
                WriteOp::DeleteAnswer(id) => {
                    tables.answers.remove(&id);
                }
                WriteOp::DeleteComment(id) => {
                    tables.comments.remove(&id);
                }
            }
        }
        Ok(())
    }
}

impl MemoryForumStore {
    async fn filtered_comments<F>(&self, keep: F) -> Result<Vec<Comment>>
    where
        F: Fn(&Comment) -> bool,
    {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> =
            tables.comments.values().filter(|c| keep(c)).cloned().collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post::new(Uuid::now_v7(), "title".into(), "content".into(), vec![]).unwrap()
    }

    #[tokio::test]
    async fn insert_bumps_version_and_reads_back() {
        let store = MemoryForumStore::new();
        let p = post();
        let id = p.id;
        store.apply(WriteBatch::new().put_post(p)).await.unwrap();

        let stored = store.get_post(id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn stale_put_is_a_conflict() {
        let store = MemoryForumStore::new();
        let p = post();
        let id = p.id;
        store.apply(WriteBatch::new().put_post(p)).await.unwrap();

        let fresh = store.get_post(id).await.unwrap().unwrap();
        let mut stale = fresh.clone();
        stale.version = 0; // pretends to be a fresh insert

        let err = store
            .apply(WriteBatch::new().put_post(stale))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // A valid put with the read version still lands.
        store.apply(WriteBatch::new().put_post(fresh)).await.unwrap();
        assert_eq!(store.get_post(id).await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn conflicting_batch_applies_nothing() {
        let store = MemoryForumStore::new();
        let existing = post();
        let existing_id = existing.id;
        store
            .apply(WriteBatch::new().put_post(existing))
            .await
            .unwrap();

        let mut stale = store.get_post(existing_id).await.unwrap().unwrap();
        stale.version = 99;
        let newcomer = post();
        let newcomer_id = newcomer.id;

        let err = store
            .apply(WriteBatch::new().put_post(newcomer).put_post(stale))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // The valid op in the same batch must not have landed.
        assert!(store.get_post(newcomer_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_absent_record_is_a_noop() {
        let store = MemoryForumStore::new();
        store
            .apply(WriteBatch::new().delete_post(Uuid::now_v7()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let store = MemoryForumStore::new();
        let mut first = post();
        let mut second = post();
        first.created_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        second.created_at = chrono::Utc::now();
        let (first_id, second_id) = (first.id, second.id);
        store
            .apply(WriteBatch::new().put_post(first).put_post(second))
            .await
            .unwrap();

        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts[0].id, second_id);
        assert_eq!(posts[1].id, first_id);
    }
}
