//! Handlers for the `/api/posts` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::Deserialize;
use services::{CascadeReport, VoteReceipt};
use uuid::Uuid;

use crate::http::error::ApiResult;
use crate::http::extract::AuthUser;
use crate::http::handlers::{parse_direction, VoteRequest};
use crate::http::state::AppState;
use crate::http::views::PostView;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post).get(list_posts))
        .route("/{post_id}/vote", post(vote_post))
        .route("/{post_id}", delete(delete_post))
}

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let created = state
        .forum
        .create_post(caller, req.title, req.content, req.tags)
        .await?;
    let authors = state.forum.author_directory(vec![caller]).await?;
    let author = authors.get(&caller);
    Ok((StatusCode::CREATED, Json(PostView::new(created, author))))
}

/// GET /api/posts — newest first, authors populated.
async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostView>>> {
    let posts = state.forum.list_posts().await?;
    let authors = state
        .forum
        .author_directory(posts.iter().map(|p| p.author).collect())
        .await?;
    let views = posts
        .into_iter()
        .map(|p| {
            let author = authors.get(&p.author);
            PostView::new(p, author)
        })
        .collect();
    Ok(Json(views))
}

/// POST /api/posts/{post_id}/vote
async fn vote_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<VoteReceipt>> {
    let direction = parse_direction(req.vote)?;
    let receipt = state.forum.vote_post(post_id, caller, direction).await?;
    Ok(Json(receipt))
}

/// DELETE /api/posts/{post_id} — cascades to answers and comments.
async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<CascadeReport>> {
    let report = state.forum.delete_post(post_id, caller).await?;
    Ok(Json(report))
}
