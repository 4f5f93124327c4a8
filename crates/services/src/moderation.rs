//! Moderation metadata bookkeeping for comments: the immutable edit
//! history and status normalization. No workflow states, no approval
//! pipeline — the status is a free-form classification field.

use chrono::{DateTime, Utc};
use domains::{Comment, EditRecord};

/// Replaces the comment content, appending the previous content to the
/// edit-history log and marking the comment edited.
pub fn record_edit(comment: &mut Comment, new_content: String, now: DateTime<Utc>) {
    let previous_content = std::mem::replace(&mut comment.content, new_content);
    comment.moderation.edit_history.push(EditRecord {
        edited_at: now,
        previous_content,
    });
    comment.is_edited = true;
    comment.updated_at = now;
}

/// Statuses are always stored lowercase.
pub fn normalize_status(raw: &str) -> String {
    raw.trim().to_lowercase()
}
