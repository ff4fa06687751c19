//! Validation engine.
//!
//! Runs the completeness, quality and accuracy checkers over one case and
//! folds their output into a single [`ValidationReport`]. The engine is
//! synchronous and never fails: absent or malformed content scores low.

use casegate_core::rules::ValidationRules;
use casegate_core::{
    CaseContent, ClinicalCase, Complexity, Severity, ValidationIssue, ValidationReport,
};

use crate::accuracy::AccuracyChecker;
use crate::completeness::CompletenessChecker;
use crate::educational::QualityChecker;

const SECTIONS: [&str; 4] = [
    "presentation",
    "clinicalData",
    "clinicalQuestion",
    "educationalNotes",
];

/// Scores case content.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    rules: ValidationRules,
    completeness: CompletenessChecker,
    quality: QualityChecker,
    accuracy: AccuracyChecker,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(ValidationRules::default())
    }
}

impl ValidationEngine {
    /// Create an engine from a rule table.
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            completeness: CompletenessChecker::new(rules.completeness.clone()),
            quality: QualityChecker::new(rules.quality.clone()),
            accuracy: AccuracyChecker::new(rules.accuracy.clone()),
            rules,
        }
    }

    /// The rules this engine scores with.
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate content.
    ///
    /// `complexity` does not change the score; thresholds per complexity are
    /// applied by the workflow when the case is submitted.
    pub fn validate(
        &self,
        content: Option<&CaseContent>,
        complexity: Option<Complexity>,
    ) -> ValidationReport {
        let completeness = self.completeness.check(content);
        let quality = self.quality.check(content);
        let accuracy = self.accuracy.check(content);

        let mut findings: Vec<ValidationIssue> = completeness
            .missing
            .iter()
            .map(|desc| {
                ValidationIssue::new(
                    Severity::Error,
                    "case",
                    format!("Missing required field: {desc}"),
                )
            })
            .collect();
        findings.extend(quality.issues);
        findings.extend(accuracy.issues);

        let w = &self.rules.weights;
        let weighted = w.completeness * f64::from(completeness.score)
            + w.quality * f64::from(quality.score)
            + w.accuracy * f64::from(accuracy.score);
        let score = weighted.round().clamp(0.0, 100.0) as u8;

        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();
        for finding in findings {
            match finding.severity {
                Severity::Error => issues.push(finding),
                Severity::Warning => warnings.push(finding),
                Severity::Info => suggestions.push(finding),
            }
        }

        let is_valid = completeness.is_complete() && issues.is_empty();

        tracing::debug!(
            score,
            completeness = completeness.score,
            quality = quality.score,
            accuracy = accuracy.score,
            is_valid,
            complexity = complexity.map(|c| c.as_str()),
            "validated case content"
        );

        ValidationReport {
            is_valid,
            score,
            completeness: completeness.score,
            quality: quality.score,
            accuracy: accuracy.score,
            issues,
            warnings,
            suggestions,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Validate a stored case with its own content and complexity.
    pub fn validate_case(&self, case: &ClinicalCase) -> ValidationReport {
        self.validate(case.content.as_ref(), case.complexity)
    }

    /// Validate many cases; reports come back in input order.
    pub fn validate_batch(&self, cases: &[ClinicalCase]) -> Vec<ValidationReport> {
        cases.iter().map(|case| self.validate_case(case)).collect()
    }

    /// Validate raw JSON content.
    ///
    /// Each section is parsed on its own, so one malformed section is dropped
    /// without losing the others. Anything other than an object is treated as
    /// absent content.
    pub fn validate_json(&self, content: &serde_json::Value) -> ValidationReport {
        let parsed = parse_content_lenient(content);
        self.validate(parsed.as_ref(), None)
    }

    /// [`validate_json`](Self::validate_json) over many documents, in order.
    pub fn validate_batch_json(&self, contents: &[serde_json::Value]) -> Vec<ValidationReport> {
        contents.iter().map(|c| self.validate_json(c)).collect()
    }
}

/// Parse content section by section, dropping sections that do not fit.
pub fn parse_content_lenient(value: &serde_json::Value) -> Option<CaseContent> {
    let object = value.as_object()?;
    let mut content = CaseContent::default();

    for section in SECTIONS {
        let Some(raw) = object.get(section) else { continue };
        let parsed = match section {
            "presentation" => serde_json::from_value(raw.clone()).map(|s| content.presentation = s),
            "clinicalData" => serde_json::from_value(raw.clone()).map(|s| content.clinical_data = s),
            "clinicalQuestion" => {
                serde_json::from_value(raw.clone()).map(|s| content.clinical_question = s)
            }
            _ => serde_json::from_value(raw.clone()).map(|s| content.educational_notes = s),
        };
        if let Err(e) = parsed {
            tracing::debug!(section, error = %e, "dropping malformed content section");
        }
    }

    Some(content)
}
