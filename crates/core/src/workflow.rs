//! Workflow value objects returned to callers.

use serde::{Deserialize, Serialize};
use crate::case::CaseStatus;
use crate::id::CaseId;
use crate::Time;

/// Outcome of one successful workflow action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    /// Always true; failures are returned as errors
    pub success: bool,
    /// Status before the action
    pub previous_status: CaseStatus,
    /// Status after the action
    pub new_status: CaseStatus,
    /// Human-readable outcome
    pub message: String,
    /// Case acted on
    pub case_id: CaseId,
    /// When the action ran
    pub timestamp: Time,
}

/// Answer to "may this case be sent to review right now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCheck {
    /// True when `reasons` is empty
    pub can_submit: bool,
    /// Every failed precondition, in check order
    pub reasons: Vec<String>,
}

impl SubmissionCheck {
    /// Build from collected reasons; no reasons means submittable.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            can_submit: reasons.is_empty(),
            reasons,
        }
    }
}

/// Read-only workflow view of a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusSummary {
    /// Current status
    pub current_status: CaseStatus,
    /// Statuses reachable from here
    pub valid_next_steps: Vec<CaseStatus>,
    /// Whether every submission precondition holds
    pub can_submit_for_review: bool,
    /// Whether the case is IN_REVIEW
    pub can_approve: bool,
    /// Whether the case is APPROVED
    pub can_publish: bool,
    /// Audit stamps
    pub review_status: ReviewStatus,
}

/// Audit timestamps and actors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatus {
    /// Submission time
    pub submitted_at: Option<Time>,
    /// Who submitted
    pub submitted_by: Option<String>,
    /// Approval time
    pub reviewed_at: Option<Time>,
    /// Who approved
    pub reviewed_by: Option<String>,
    /// Publication time
    pub published_at: Option<Time>,
    /// Who published
    pub published_by: Option<String>,
    /// Archival time
    pub archived_at: Option<Time>,
    /// Who archived
    pub archived_by: Option<String>,
}
