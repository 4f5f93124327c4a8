use std::sync::Arc;

use domains::IdentityResolver;
use services::Forum;

/// Shared state handed to every handler via `State<AppState>`.
/// Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    pub forum: Forum,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    pub fn new(forum: Forum, identity: Arc<dyn IdentityResolver>) -> Self {
        Self { forum, identity }
    }
}
