//! Read-side aggregation views. Pure projections over the content graph
//! and vote ledgers: idempotent, side-effect free, recomputed on demand.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domains::{Comment, CommentKind, CommentParent, Result, UserRef};
use serde::Serialize;
use uuid::Uuid;

use crate::Forum;

/// Default number of top commenters returned by the author stats view.
pub const STATS_TOP_N: usize = 10;
/// Default page size of the detailed comment listing.
pub const DETAILED_PAGE_SIZE: usize = 20;

/// Per-kind comment counts for one author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindBreakdown {
    pub question: usize,
    pub answer: usize,
    pub general: usize,
}

impl KindBreakdown {
    fn bump(&mut self, kind: CommentKind) {
        match kind {
            CommentKind::Question => self.question += 1,
            CommentKind::Answer => self.answer += 1,
            CommentKind::General => self.general += 1,
        }
    }
}

/// Grouped comment statistics for one author, ordered by comment count.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorCommentStats {
    pub author: Uuid,
    pub username: Option<String>,
    pub total_comments: usize,
    pub total_score: i64,
    pub average_score: f64,
    pub kinds: KindBreakdown,
    pub last_comment_at: DateTime<Utc>,
}

/// A comment joined with its author display fields and its parent's
/// headline (post title or answer body).
#[derive(Debug, Clone, Serialize)]
pub struct DetailedComment {
    pub id: Uuid,
    pub content: String,
    pub kind: CommentKind,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub author_username: Option<String>,
    pub author_reputation: Option<i64>,
    pub post_title: Option<String>,
    pub answer_body: Option<String>,
}

/// Groups comments by author and computes the per-author statistics.
/// Ordered by total comments descending, truncated to `limit`.
pub(crate) fn build_author_stats(
    comments: &[Comment],
    users: &HashMap<Uuid, UserRef>,
    limit: usize,
) -> Vec<AuthorCommentStats> {
    let mut by_author: HashMap<Uuid, AuthorCommentStats> = HashMap::new();
    for comment in comments {
        let entry = by_author
            .entry(comment.author)
            .or_insert_with(|| AuthorCommentStats {
                author: comment.author,
                username: users.get(&comment.author).map(|u| u.username.clone()),
                total_comments: 0,
                total_score: 0,
                average_score: 0.0,
                kinds: KindBreakdown::default(),
                last_comment_at: comment.created_at,
            });
        entry.total_comments += 1;
        entry.total_score += comment.score();
        entry.kinds.bump(comment.kind);
        if comment.created_at > entry.last_comment_at {
            entry.last_comment_at = comment.created_at;
        }
    }

    let mut stats: Vec<AuthorCommentStats> = by_author
        .into_values()
        .map(|mut s| {
            s.average_score = s.total_score as f64 / s.total_comments as f64;
            s
        })
        .collect();
    stats.sort_by(|a, b| {
        b.total_comments
            .cmp(&a.total_comments)
            .then(b.last_comment_at.cmp(&a.last_comment_at))
    });
    stats.truncate(limit);
    stats
}

impl Forum {
    /// Top commenters with score and kind breakdowns. `limit` defaults to
    /// [`STATS_TOP_N`].
    pub async fn author_comment_stats(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<AuthorCommentStats>> {
        let comments = self.store().list_comments().await?;
        let authors: Vec<Uuid> = comments.iter().map(|c| c.author).collect();
        let users = self.author_directory(authors).await?;
        Ok(build_author_stats(
            &comments,
            &users,
            limit.unwrap_or(STATS_TOP_N),
        ))
    }

    /// Recency-ordered comment listing joined with author and parent
    /// display fields. `limit` defaults to [`DETAILED_PAGE_SIZE`].
    pub async fn detailed_comments(&self, limit: Option<usize>) -> Result<Vec<DetailedComment>> {
        let mut comments = self.store().list_comments().await?;
        comments.truncate(limit.unwrap_or(DETAILED_PAGE_SIZE));

        let authors: Vec<Uuid> = comments.iter().map(|c| c.author).collect();
        let users = self.author_directory(authors).await?;

        let mut out = Vec::with_capacity(comments.len());
        for comment in comments {
            let (post_title, answer_body) = match comment.parent {
                CommentParent::Post(id) => (
                    self.store().get_post(id).await?.map(|p| p.title),
                    None,
                ),
                CommentParent::Answer(id) => (
                    None,
                    self.store().get_answer(id).await?.map(|a| a.body),
                ),
            };
            let user = users.get(&comment.author);
            out.push(DetailedComment {
                id: comment.id,
                content: comment.content,
                kind: comment.kind,
                score: comment.votes.score(),
                created_at: comment.created_at,
                author_username: user.map(|u| u.username.clone()),
                author_reputation: user.map(|u| u.reputation),
                post_title,
                answer_body,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::VoteDirection;

    fn comment(author: Uuid, kind: CommentKind, upvoters: usize) -> Comment {
        let mut c = Comment::new(
            author,
            CommentParent::Post(Uuid::now_v7()),
            "some comment body",
            kind,
            vec![],
        )
        .unwrap();
        for i in 0..upvoters {
            c.votes.apply(Uuid::from_u128(i as u128 + 1), VoteDirection::Up);
        }
        c
    }

    #[test]
    fn stats_group_sort_and_truncate() {
        let prolific = Uuid::now_v7();
        let quiet = Uuid::now_v7();
        let comments = vec![
            comment(prolific, CommentKind::Question, 2),
            comment(prolific, CommentKind::General, 0),
            comment(prolific, CommentKind::General, 4),
            comment(quiet, CommentKind::Answer, 1),
        ];
        let mut users = HashMap::new();
        users.insert(
            prolific,
            UserRef { id: prolific, username: "prolific".into(), reputation: 10, version: 1 },
        );

        let stats = build_author_stats(&comments, &users, 10);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].author, prolific);
        assert_eq!(stats[0].username.as_deref(), Some("prolific"));
        assert_eq!(stats[0].total_comments, 3);
        assert_eq!(stats[0].total_score, 6);
        assert!((stats[0].average_score - 2.0).abs() < f64::EPSILON);
        assert_eq!(stats[0].kinds, KindBreakdown { question: 1, answer: 0, general: 2 });
        assert_eq!(stats[1].total_comments, 1);
        assert!(stats[1].username.is_none());

        let top_one = build_author_stats(&comments, &users, 1);
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].author, prolific);
    }
}
