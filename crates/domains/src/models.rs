//! # Domain Models
//!
//! The three content entities (Post, Answer, Comment), the per-item Vote
//! Ledger and its toggle/flip state machine, and the satellite moderation
//! metadata. We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Minimum comment length after trimming.
pub const COMMENT_MIN_LEN: usize = 3;
/// Maximum comment length after trimming.
pub const COMMENT_MAX_LEN: usize = 500;

/// A single vote direction. Serialized as `1` / `-1` on the wire and in
/// stored documents, matching the ledger entry format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Numeric weight of the direction (+1 or -1).
    pub fn weight(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl From<VoteDirection> for i8 {
    fn from(d: VoteDirection) -> i8 {
        d.weight() as i8
    }
}

impl TryFrom<i8> for VoteDirection {
    type Error = String;

    fn try_from(value: i8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteDirection::Up),
            -1 => Ok(VoteDirection::Down),
            other => Err(format!("{other} is not a valid vote direction")),
        }
    }
}

/// Per-entity-kind vote legality. Posts and Answers accept both directions;
/// Comments are upvote-only. Kept as an explicit policy value rather than a
/// single shared rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePolicy {
    UpAndDown,
    UpOnly,
}

impl VotePolicy {
    pub fn allows(self, direction: VoteDirection) -> bool {
        match self {
            VotePolicy::UpAndDown => true,
            VotePolicy::UpOnly => direction == VoteDirection::Up,
        }
    }
}

/// One ledger entry: a voter and the direction they currently hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEntry {
    pub user: Uuid,
    pub vote: VoteDirection,
}

/// What [`VoteLedger::apply`] did with an incoming vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    /// No prior vote existed; the entry was inserted.
    Cast,
    /// The opposite direction was held; the entry was overwritten.
    Flipped,
    /// The same direction was held; the entry was removed (toggle-off).
    Withdrawn,
}

/// The set of (voter, direction) pairs attached to a single item, with at
/// most one entry per voter. The single source of truth for vote state;
/// all counts are derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLedger(Vec<VoteEntry>);

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The toggle/flip state machine. Three states per voter: no-vote,
    /// voted(+1), voted(-1).
    ///
    /// * no-vote -> voted(direction): insert.
    /// * voted(d), d == direction -> no-vote: remove (toggle-off).
    /// * voted(d), d != direction -> voted(direction): overwrite (flip).
    pub fn apply(&mut self, voter: Uuid, direction: VoteDirection) -> VoteOutcome {
        match self.0.iter().position(|e| e.user == voter) {
            Some(i) if self.0[i].vote == direction => {
                self.0.remove(i);
                VoteOutcome::Withdrawn
            }
            Some(i) => {
                self.0[i].vote = direction;
                VoteOutcome::Flipped
            }
            None => {
                self.0.push(VoteEntry { user: voter, vote: direction });
                VoteOutcome::Cast
            }
        }
    }

    pub fn upvotes(&self) -> usize {
        self.0.iter().filter(|e| e.vote == VoteDirection::Up).count()
    }

    pub fn downvotes(&self) -> usize {
        self.0.iter().filter(|e| e.vote == VoteDirection::Down).count()
    }

    /// upvotes - downvotes.
    pub fn score(&self) -> i64 {
        self.0.iter().map(|e| e.vote.weight()).sum()
    }

    /// The direction `voter` currently holds, if any.
    pub fn user_vote(&self, voter: Uuid) -> Option<VoteDirection> {
        self.0.iter().find(|e| e.user == voter).map(|e| e.vote)
    }

    pub fn entries(&self) -> &[VoteEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A question thread root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Uuid,
    pub tags: Vec<String>,
    pub votes: VoteLedger,
    pub created_at: DateTime<Utc>,
    /// Store version used for compare-and-set writes; 0 means "not yet
    /// persisted". Never exposed to API clients.
    #[serde(default)]
    pub version: u64,
}

impl Post {
    pub const VOTE_POLICY: VotePolicy = VotePolicy::UpAndDown;

    pub fn new(author: Uuid, title: String, content: String, tags: Vec<String>) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("post title must not be empty".into()));
        }
        if content.trim().is_empty() {
            return Err(AppError::Validation("post content must not be empty".into()));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            title,
            content,
            author,
            tags,
            votes: VoteLedger::new(),
            created_at: Utc::now(),
            version: 0,
        })
    }
}

/// An answer to a Post. The parent reference is required and immutable
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub body: String,
    pub author: Uuid,
    pub post_id: Uuid,
    pub votes: VoteLedger,
    /// At most one accepted Answer exists per Post at any time.
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Answer {
    pub const VOTE_POLICY: VotePolicy = VotePolicy::UpAndDown;

    pub fn new(author: Uuid, post_id: Uuid, body: String) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(AppError::Validation("answer body must not be empty".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            body,
            author,
            post_id,
            votes: VoteLedger::new(),
            accepted: false,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }
}

/// The closed comment classification enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    Question,
    Answer,
    General,
}

impl Default for CommentKind {
    fn default() -> Self {
        CommentKind::General
    }
}

/// A comment hangs off exactly one Post or exactly one Answer. Modeling the
/// parent as a tagged variant makes the "both set / both unset" illegal
/// state unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentParent {
    Post(Uuid),
    Answer(Uuid),
}

impl CommentParent {
    pub fn post_id(self) -> Option<Uuid> {
        match self {
            CommentParent::Post(id) => Some(id),
            CommentParent::Answer(_) => None,
        }
    }

    pub fn answer_id(self) -> Option<Uuid> {
        match self {
            CommentParent::Post(_) => None,
            CommentParent::Answer(id) => Some(id),
        }
    }
}

/// One immutable edit-history entry: when, and what the content was before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    pub edited_at: DateTime<Utc>,
    pub previous_content: String,
}

/// Moderation bookkeeping attached to a Comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationMeta {
    pub edit_history: Vec<EditRecord>,
    pub flags: u32,
}

/// A leaf comment on a Post or an Answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub author: Uuid,
    pub parent: CommentParent,
    pub kind: CommentKind,
    /// Free-form classification, normalized to lowercase on every write.
    /// No transition graph is enforced.
    pub status: String,
    pub mentions: Vec<String>,
    /// Up-only ledger; the comment score is derived from it.
    pub votes: VoteLedger,
    pub is_edited: bool,
    pub moderation: ModerationMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Comment {
    pub const VOTE_POLICY: VotePolicy = VotePolicy::UpOnly;
    pub const DEFAULT_STATUS: &'static str = "approved";

    pub fn new(
        author: Uuid,
        parent: CommentParent,
        content: &str,
        kind: CommentKind,
        mentions: Vec<String>,
    ) -> Result<Self> {
        let content = Self::validate_content(content)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            content,
            author,
            parent,
            kind,
            status: Self::DEFAULT_STATUS.to_string(),
            mentions,
            votes: VoteLedger::new(),
            is_edited: false,
            moderation: ModerationMeta::default(),
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Trims and length-checks comment content ([COMMENT_MIN_LEN],
    /// [COMMENT_MAX_LEN]). Returns the trimmed content.
    pub fn validate_content(raw: &str) -> Result<String> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < COMMENT_MIN_LEN {
            return Err(AppError::Validation(format!(
                "comment must be at least {COMMENT_MIN_LEN} characters long"
            )));
        }
        if trimmed.chars().count() > COMMENT_MAX_LEN {
            return Err(AppError::Validation(format!(
                "comment must be at most {COMMENT_MAX_LEN} characters long"
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Derived score; the ledger is up-only so this equals the upvote count.
    pub fn score(&self) -> i64 {
        self.votes.score()
    }
}

/// Read-side directory record for author display fields. Account lifecycle
/// is owned by the external identity system; the core only joins against
/// these for populated listings and aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
    pub reputation: i64,
    #[serde(default)]
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(n: u8) -> Uuid {
        Uuid::from_bytes([n; 16])
    }

    #[test]
    fn ledger_cast_then_toggle_off() {
        let mut ledger = VoteLedger::new();
        assert_eq!(ledger.apply(voter(1), VoteDirection::Up), VoteOutcome::Cast);
        assert_eq!(ledger.upvotes(), 1);
        // Same direction twice in succession yields no-vote.
        assert_eq!(
            ledger.apply(voter(1), VoteDirection::Up),
            VoteOutcome::Withdrawn
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn ledger_flip_keeps_single_entry() {
        let mut ledger = VoteLedger::new();
        ledger.apply(voter(1), VoteDirection::Up);
        assert_eq!(
            ledger.apply(voter(1), VoteDirection::Down),
            VoteOutcome::Flipped
        );
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.user_vote(voter(1)), Some(VoteDirection::Down));
        assert_eq!(ledger.score(), -1);
    }

    #[test]
    fn ledger_two_voters_scenario() {
        // U1 upvotes, U2 downvotes, U1 upvotes again (toggle-off).
        let mut ledger = VoteLedger::new();
        ledger.apply(voter(1), VoteDirection::Up);
        ledger.apply(voter(2), VoteDirection::Down);
        assert_eq!(ledger.score(), 0);
        assert_eq!(
            ledger.apply(voter(1), VoteDirection::Up),
            VoteOutcome::Withdrawn
        );
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.user_vote(voter(2)), Some(VoteDirection::Down));
        assert_eq!(ledger.score(), -1);
    }

    #[test]
    fn direction_wire_format() {
        assert_eq!(serde_json::to_string(&VoteDirection::Up).unwrap(), "1");
        assert_eq!(serde_json::to_string(&VoteDirection::Down).unwrap(), "-1");
        assert_eq!(
            serde_json::from_str::<VoteDirection>("-1").unwrap(),
            VoteDirection::Down
        );
        assert!(serde_json::from_str::<VoteDirection>("0").is_err());
    }

    #[test]
    fn comment_policy_is_up_only() {
        assert!(Comment::VOTE_POLICY.allows(VoteDirection::Up));
        assert!(!Comment::VOTE_POLICY.allows(VoteDirection::Down));
        assert!(Post::VOTE_POLICY.allows(VoteDirection::Down));
        assert!(Answer::VOTE_POLICY.allows(VoteDirection::Down));
    }

    #[test]
    fn comment_content_bounds() {
        let author = voter(1);
        let parent = CommentParent::Post(Uuid::now_v7());
        assert!(Comment::new(author, parent, "ok", CommentKind::General, vec![]).is_err());
        assert!(Comment::new(author, parent, "  ok  ", CommentKind::General, vec![]).is_err());
        let long = "x".repeat(COMMENT_MAX_LEN + 1);
        assert!(Comment::new(author, parent, &long, CommentKind::General, vec![]).is_err());
        let comment =
            Comment::new(author, parent, "  a perfectly fine comment  ", CommentKind::Question, vec![])
                .unwrap();
        assert_eq!(comment.content, "a perfectly fine comment");
        assert_eq!(comment.status, "approved");
        assert!(!comment.is_edited);
    }

    #[test]
    fn comment_parent_is_exactly_one() {
        let id = Uuid::now_v7();
        let on_post = CommentParent::Post(id);
        assert_eq!(on_post.post_id(), Some(id));
        assert_eq!(on_post.answer_id(), None);
        let on_answer = CommentParent::Answer(id);
        assert_eq!(on_answer.post_id(), None);
        assert_eq!(on_answer.answer_id(), Some(id));
    }
}
