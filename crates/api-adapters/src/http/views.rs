//! Response shapes. Vote counts are recomputed from the ledger here and
//! nowhere persisted; the `version` field never leaves the process.

use chrono::{DateTime, Utc};
use domains::{Answer, Comment, CommentKind, CommentParent, ModerationMeta, Post, UserRef, VoteEntry};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Uuid,
    pub author_username: Option<String>,
    pub tags: Vec<String>,
    pub votes: Vec<VoteEntry>,
    pub upvotes: usize,
    pub downvotes: usize,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: Post, author: Option<&UserRef>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author: post.author,
            author_username: author.map(|u| u.username.clone()),
            tags: post.tags,
            upvotes: post.votes.upvotes(),
            downvotes: post.votes.downvotes(),
            score: post.votes.score(),
            votes: post.votes.entries().to_vec(),
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerView {
    pub id: Uuid,
    pub body: String,
    pub author: Uuid,
    pub author_username: Option<String>,
    pub author_reputation: Option<i64>,
    pub post_id: Uuid,
    pub accepted: bool,
    pub votes: Vec<VoteEntry>,
    pub upvotes: usize,
    pub downvotes: usize,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnswerView {
    pub fn new(answer: Answer, author: Option<&UserRef>) -> Self {
        Self {
            id: answer.id,
            body: answer.body,
            author: answer.author,
            author_username: author.map(|u| u.username.clone()),
            author_reputation: author.map(|u| u.reputation),
            post_id: answer.post_id,
            accepted: answer.accepted,
            upvotes: answer.votes.upvotes(),
            downvotes: answer.votes.downvotes(),
            score: answer.votes.score(),
            votes: answer.votes.entries().to_vec(),
            created_at: answer.created_at,
            updated_at: answer.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub author: Uuid,
    pub author_username: Option<String>,
    pub author_reputation: Option<i64>,
    pub parent: CommentParent,
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub status: String,
    pub mentions: Vec<String>,
    pub score: i64,
    pub is_edited: bool,
    pub moderation: ModerationMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: Comment, author: Option<&UserRef>) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            author: comment.author,
            author_username: author.map(|u| u.username.clone()),
            author_reputation: author.map(|u| u.reputation),
            parent: comment.parent,
            kind: comment.kind,
            status: comment.status,
            mentions: comment.mentions,
            score: comment.votes.score(),
            is_edited: comment.is_edited,
            moderation: comment.moderation,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
