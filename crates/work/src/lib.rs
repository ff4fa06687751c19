//! Case workflow.
//!
//! The review state machine, its actions, and the review queue.

#![warn(missing_docs)]

pub mod action;
pub mod engine;
pub mod error;
pub mod queue;

pub use action::{
    submission_reasons, ApproveCase, ArchiveCase, PublishCase, RejectCase, SubmitForReview,
    WorkflowAction,
};
pub use engine::WorkflowEngine;
pub use error::{ErrorKind, Result, WorkflowError};
pub use queue::{QueueEntry, QueuePriority, QueueStats, ReviewQueue};
