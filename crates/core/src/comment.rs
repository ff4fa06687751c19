//! Audit trail comments.

use serde::{Deserialize, Serialize};
use crate::id::{CaseId, CommentId};
use crate::Time;

/// An append-only audit comment attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseComment {
    /// Unique identifier
    pub id: CommentId,

    /// Case this comment belongs to
    pub case_id: CaseId,

    /// Free text; workflow actions prefix it with their marker
    pub content: String,

    /// Actor who wrote it
    pub author: String,

    /// Whether the comment is part of a review decision
    pub is_review: bool,

    /// Creation timestamp
    pub created_at: Time,
}

impl CaseComment {
    /// Create a review comment stamped with the current time.
    pub fn review(case_id: CaseId, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: CommentId::new(),
            case_id,
            content: content.into(),
            author: author.into(),
            is_review: true,
            created_at: chrono::Utc::now(),
        }
    }
}
