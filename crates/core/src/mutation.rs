//! Field-level updates applied to a stored case.

use serde::{Deserialize, Serialize};
use crate::case::{CaseStatus, ClinicalCase};
use crate::Time;

/// A partial update to a case. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseMutation {
    /// New lifecycle status
    pub status: Option<CaseStatus>,
    /// New validity flag
    pub validated: Option<bool>,
    /// New validation score
    pub validation_score: Option<u8>,
    /// Review submission stamp
    pub submitted_for_review: Option<AuditStamp>,
    /// Approval stamp
    pub reviewed: Option<AuditStamp>,
    /// Publication stamp
    pub published: Option<AuditStamp>,
    /// Archival stamp
    pub archived: Option<AuditStamp>,
}

/// Who did something, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStamp {
    /// When it happened
    pub at: Time,
    /// Actor identifier
    pub by: String,
}

impl AuditStamp {
    /// Stamp for `by` at `at`.
    pub fn new(by: impl Into<String>, at: Time) -> Self {
        Self { at, by: by.into() }
    }
}

impl CaseMutation {
    /// Mutation that only moves the status.
    pub fn status(status: CaseStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Mutation that records a validation outcome.
    pub fn validation(validated: bool, score: u8) -> Self {
        Self {
            validated: Some(validated),
            validation_score: Some(score),
            ..Default::default()
        }
    }

    /// True when applying this mutation would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write the set fields into `case` and bump `updated_at`.
    pub fn apply_to(&self, case: &mut ClinicalCase, now: Time) {
        if let Some(status) = self.status {
            case.status = status;
        }
        if let Some(validated) = self.validated {
            case.validated = validated;
        }
        if let Some(score) = self.validation_score {
            case.validation_score = Some(score);
        }
        if let Some(stamp) = &self.submitted_for_review {
            case.submitted_for_review_at = Some(stamp.at);
            case.submitted_for_review_by = Some(stamp.by.clone());
        }
        if let Some(stamp) = &self.reviewed {
            case.reviewed_at = Some(stamp.at);
            case.reviewed_by = Some(stamp.by.clone());
        }
        if let Some(stamp) = &self.published {
            case.published_at = Some(stamp.at);
            case.published_by = Some(stamp.by.clone());
        }
        if let Some(stamp) = &self.archived {
            case.archived_at = Some(stamp.at);
            case.archived_by = Some(stamp.by.clone());
        }
        case.updated_at = now;
    }
}
