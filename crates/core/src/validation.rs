//! Validation report model.

use serde::{Deserialize, Serialize};
use crate::Time;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only
    Info,
    /// Lowers the score, never blocks
    Warning,
    /// Blocks validity
    Error,
}

/// A single finding produced by one of the checkers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// How serious the finding is
    pub severity: Severity,

    /// Dotted path of the offending field, or `case` for missing sections
    pub field: String,

    /// Human-readable description
    pub message: String,

    /// How to fix it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Build an issue without a suggestion.
    pub fn new(severity: Severity, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Result of validating one case. Built fresh on every call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Complete and free of error-severity issues
    pub is_valid: bool,

    /// Weighted overall score (0-100)
    pub score: u8,

    /// Completeness sub-score (0-100)
    pub completeness: u8,

    /// Educational quality sub-score (0-100)
    pub quality: u8,

    /// Medical accuracy sub-score (0-100)
    pub accuracy: u8,

    /// Error-severity findings
    pub issues: Vec<ValidationIssue>,

    /// Warning-severity findings
    pub warnings: Vec<ValidationIssue>,

    /// Info-severity findings
    pub suggestions: Vec<ValidationIssue>,

    /// When the report was produced
    pub timestamp: Time,
}

impl ValidationReport {
    /// Every finding regardless of severity, errors first.
    pub fn all_findings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .chain(self.warnings.iter())
            .chain(self.suggestions.iter())
    }
}
