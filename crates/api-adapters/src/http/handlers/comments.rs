//! Handlers for the `/api/comments` resource, including the two read-side
//! aggregation endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use domains::{AppError, Comment, CommentKind, CommentParent, UserRef};
use serde::Deserialize;
use services::{AuthorCommentStats, CommentEdit, DetailedComment, VoteReceipt};
use std::collections::HashMap;
use uuid::Uuid;

use crate::http::error::{ApiError, ApiResult};
use crate::http::extract::AuthUser;
use crate::http::state::AppState;
use crate::http::views::CommentView;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Exactly one of `post` / `answer` must be present.
    pub post: Option<Uuid>,
    pub answer: Option<Uuid>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    pub content: Option<String>,
    pub status: Option<String>,
    pub mentions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub limit: Option<usize>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment).get(list_comments))
        .route("/post/{post_id}", get(comments_by_post))
        .route("/answer/{answer_id}", get(comments_by_answer))
        .route("/author/{author_id}", get(comments_by_author))
        .route("/stats/aggregate", get(author_stats))
        .route("/stats/detailed", get(detailed_comments))
        .route("/{comment_id}", put(edit_comment).delete(delete_comment))
        .route("/{comment_id}/upvote", post(upvote_comment))
}

fn parse_kind(raw: Option<&str>) -> Result<CommentKind, ApiError> {
    match raw {
        None => Ok(CommentKind::default()),
        Some(s) => match s.to_lowercase().as_str() {
            "question" => Ok(CommentKind::Question),
            "answer" => Ok(CommentKind::Answer),
            "general" => Ok(CommentKind::General),
            other => Err(ApiError(AppError::Validation(format!(
                "{other} is not a valid comment type"
            )))),
        },
    }
}

fn parse_parent(post: Option<Uuid>, answer: Option<Uuid>) -> Result<CommentParent, ApiError> {
    match (post, answer) {
        (Some(id), None) => Ok(CommentParent::Post(id)),
        (None, Some(id)) => Ok(CommentParent::Answer(id)),
        _ => Err(ApiError(AppError::InvalidReference(
            "a comment must reference exactly one of post or answer".into(),
        ))),
    }
}

async fn populate(state: &AppState, comments: Vec<Comment>) -> ApiResult<Vec<CommentView>> {
    let authors: HashMap<Uuid, UserRef> = state
        .forum
        .author_directory(comments.iter().map(|c| c.author).collect())
        .await?;
    Ok(comments
        .into_iter()
        .map(|c| {
            let author = authors.get(&c.author);
            CommentView::new(c, author)
        })
        .collect())
}

/// POST /api/comments
async fn create_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let kind = parse_kind(req.kind.as_deref())?;
    let parent = parse_parent(req.post, req.answer)?;
    let created = state
        .forum
        .create_comment(caller, parent, &req.content, kind, req.mentions)
        .await?;
    let mut views = populate(&state, vec![created]).await?;
    Ok((StatusCode::CREATED, Json(views.remove(0))))
}

/// GET /api/comments
async fn list_comments(State(state): State<AppState>) -> ApiResult<Json<Vec<CommentView>>> {
    let comments = state.forum.list_comments().await?;
    Ok(Json(populate(&state, comments).await?))
}

/// GET /api/comments/post/{post_id}
async fn comments_by_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let comments = state.forum.comments_for_post(post_id).await?;
    Ok(Json(populate(&state, comments).await?))
}

/// GET /api/comments/answer/{answer_id}
async fn comments_by_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let comments = state.forum.comments_for_answer(answer_id).await?;
    Ok(Json(populate(&state, comments).await?))
}

/// GET /api/comments/author/{author_id}
async fn comments_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let comments = state.forum.comments_by_author(author_id).await?;
    Ok(Json(populate(&state, comments).await?))
}

/// GET /api/comments/stats/aggregate — top commenters.
async fn author_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> ApiResult<Json<Vec<AuthorCommentStats>>> {
    Ok(Json(state.forum.author_comment_stats(params.limit).await?))
}

/// GET /api/comments/stats/detailed — joined recency listing.
async fn detailed_comments(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> ApiResult<Json<Vec<DetailedComment>>> {
    Ok(Json(state.forum.detailed_comments(params.limit).await?))
}

/// PUT /api/comments/{comment_id}
async fn edit_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
    Json(req): Json<EditCommentRequest>,
) -> ApiResult<Json<CommentView>> {
    let edit = CommentEdit {
        content: req.content,
        status: req.status,
        mentions: req.mentions,
    };
    let edited = state.forum.edit_comment(comment_id, caller, edit).await?;
    let mut views = populate(&state, vec![edited]).await?;
    Ok(Json(views.remove(0)))
}

/// POST /api/comments/{comment_id}/upvote — comments are upvote-only.
async fn upvote_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<VoteReceipt>> {
    let receipt = state.forum.upvote_comment(comment_id, caller).await?;
    Ok(Json(receipt))
}

/// DELETE /api/comments/{comment_id} — leaf delete, no cascade.
async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    AuthUser(caller): AuthUser,
) -> ApiResult<StatusCode> {
    state.forum.delete_comment(comment_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
