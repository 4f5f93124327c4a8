//! Application router. Both the production binary and the integration
//! tests build the router through [`router`], so they share the exact same
//! middleware stack.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{answers, comments, posts};
use crate::http::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/api/posts", posts::routes())
        .nest("/api/answers", answers::routes())
        .nest("/api/comments", comments::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "API is running"
}
