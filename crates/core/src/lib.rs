//! casegate core data models.
//!
//! This crate defines the clinical case record, its structured content,
//! the validation and workflow value objects, and the rule tables every
//! engine is configured with.

#![warn(missing_docs)]

// Core identities
mod id;

// Case records
mod case;
mod content;
mod comment;
mod mutation;

// Engine outputs
mod validation;
mod workflow;

// Configuration
pub mod rules;

// Re-exports
pub use id::*;

pub use case::{ClinicalCase, CaseStatus, Complexity, CaseFilter, UnknownLabel};
pub use content::{
    CaseContent, Presentation, Demographics, Medication, ClinicalData, LabResult,
    OtherTest, ClinicalQuestion, AnswerOption, Reference, EducationalNotes,
};
pub use comment::CaseComment;
pub use mutation::{CaseMutation, AuditStamp};
pub use validation::{Severity, ValidationIssue, ValidationReport};
pub use workflow::{WorkflowResult, SubmissionCheck, WorkflowStatusSummary, ReviewStatus};
pub use rules::{ScoreRules, RulesError, ScoreBand};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
