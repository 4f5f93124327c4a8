//! Handlers for the `/api/answers` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use services::{AcceptReceipt, CascadeReport, VoteReceipt};
use uuid::Uuid;

use crate::http::error::ApiResult;
use crate::http::extract::AuthUser;
use crate::http::handlers::{parse_direction, VoteRequest};
use crate::http::state::AppState;
use crate::http::views::AnswerView;

#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    pub body: String,
    /// Parent post id, required and immutable after creation.
    pub post: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EditAnswerRequest {
    pub body: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_answer))
        .route("/post/{post_id}", get(answers_by_post))
        .route("/{answer_id}", put(edit_answer).delete(delete_answer))
        .route("/{answer_id}/vote", post(vote_answer))
        .route("/{answer_id}/accept", post(accept_answer))
}

/// POST /api/answers
async fn create_answer(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreateAnswerRequest>,
) -> ApiResult<(StatusCode, Json<AnswerView>)> {
    let created = state.forum.create_answer(req.post, caller, req.body).await?;
    let authors = state.forum.author_directory(vec![caller]).await?;
    let author = authors.get(&caller);
    Ok((StatusCode::CREATED, Json(AnswerView::new(created, author))))
}

/// GET /api/answers/post/{post_id} — newest first, authors populated.
async fn answers_by_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AnswerView>>> {
    let answers = state.forum.answers_for_post(post_id).await?;
    let authors = state
        .forum
        .author_directory(answers.iter().map(|a| a.author).collect())
        .await?;
    let views = answers
        .into_iter()
        .map(|a| {
            let author = authors.get(&a.author);
            AnswerView::new(a, author)
        })
        .collect();
    Ok(Json(views))
}

/// PUT /api/answers/{answer_id}
async fn edit_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
    Json(req): Json<EditAnswerRequest>,
) -> ApiResult<Json<AnswerView>> {
    let edited = state.forum.edit_answer(answer_id, caller, req.body).await?;
    let authors = state.forum.author_directory(vec![edited.author]).await?;
    let author = authors.get(&edited.author);
    Ok(Json(AnswerView::new(edited, author)))
}

/// POST /api/answers/{answer_id}/vote
async fn vote_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<VoteReceipt>> {
    let direction = parse_direction(req.vote)?;
    let receipt = state.forum.vote_answer(answer_id, caller, direction).await?;
    Ok(Json(receipt))
}

/// POST /api/answers/{answer_id}/accept — post-author-only toggle.
async fn accept_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<AcceptReceipt>> {
    let receipt = state.forum.toggle_accept_answer(answer_id, caller).await?;
    Ok(Json(receipt))
}

/// DELETE /api/answers/{answer_id} — cascades to dependent comments.
async fn delete_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<CascadeReport>> {
    let report = state.forum.delete_answer(answer_id, caller).await?;
    Ok(Json(report))
}
