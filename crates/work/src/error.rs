//! Workflow errors.

use casegate_core::{CaseId, CaseStatus};
use casegate_storage::StorageError;

/// Result alias for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Why a workflow action could not proceed.
///
/// Everything except `Storage` is an expected business outcome the caller
/// presents to the user; `Storage` is a fault in the backing store.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The case does not exist
    #[error("case not found: {0}")]
    NotFound(CaseId),

    /// One or more business rules are unmet
    #[error("precondition failed: {}", .reasons.join(", "))]
    Precondition {
        /// Every failed rule, in check order
        reasons: Vec<String>,
    },

    /// The target status is not reachable from the current one
    #[error("cannot move a case from {from} to {to}")]
    IllegalTransition {
        /// Current status
        from: CaseStatus,
        /// Requested status
        to: CaseStatus,
    },

    /// The persisted score is below what the action requires
    #[error("validation score {} is below the required {required}", display_score(.score))]
    InsufficientScore {
        /// Persisted score, `None` when never validated
        score: Option<u8>,
        /// Required minimum
        required: u8,
    },

    /// A rejection needs a reason
    #[error("a rejection reason is required")]
    EmptyReason,

    /// More suggestions than the rules allow
    #[error("at most {max} suggestions are allowed, got {given}")]
    TooManySuggestions {
        /// Allowed number
        max: usize,
        /// Number given
        given: usize,
    },

    /// The case store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Coarse classification for mapping errors onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing case
    NotFound,
    /// Blocked by a business rule
    Precondition,
    /// Illegal status change
    IllegalTransition,
    /// Store fault
    Storage,
}

impl WorkflowError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Precondition { .. }
            | Self::InsufficientScore { .. }
            | Self::EmptyReason
            | Self::TooManySuggestions { .. } => ErrorKind::Precondition,
            Self::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether the referenced case is missing.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

fn display_score(score: &Option<u8>) -> String {
    score.map_or_else(|| "(none)".to_string(), |s| s.to_string())
}
