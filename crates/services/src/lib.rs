//! # services
//!
//! The core engine behind the transport layer: vote application, content
//! graph mutations with cascade planning, answer acceptance exclusivity,
//! and read-side aggregation views. Everything here talks to persistence
//! through the [`ForumStore`] port only.

use std::collections::HashMap;
use std::sync::Arc;

use domains::{ForumStore, Result, UserRef};
use uuid::Uuid;

pub mod acceptance;
pub mod aggregation;
pub mod content;
pub mod moderation;
pub mod vote;

pub use acceptance::AcceptReceipt;
pub use aggregation::{AuthorCommentStats, DetailedComment, KindBreakdown};
pub use content::{CascadeReport, CommentEdit};
pub use vote::VoteReceipt;

/// The service facade handed to the transport layer. Cheap to clone.
#[derive(Clone)]
pub struct Forum {
    store: Arc<dyn ForumStore>,
}

impl Forum {
    pub fn new(store: Arc<dyn ForumStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn ForumStore {
        self.store.as_ref()
    }

    /// Fetches directory records for a set of authors, keyed by id.
    /// Used by listings that populate author display fields.
    pub async fn author_directory(&self, mut ids: Vec<Uuid>) -> Result<HashMap<Uuid, UserRef>> {
        ids.sort_unstable();
        ids.dedup();
        let users = self.store.users_by_ids(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}
