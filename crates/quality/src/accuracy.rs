//! Medical plausibility scoring.
//!
//! Numeric vital signs and lab values are compared against reference
//! ranges, plus one cross-field check: a fever complaint should come with
//! an elevated temperature. Nothing here understands free text beyond
//! substring matching.

use std::sync::OnceLock;

use regex::Regex;
use casegate_core::rules::AccuracyRules;
use casegate_core::{CaseContent, ClinicalData, Severity, ValidationIssue};

use crate::educational::CheckOutcome;

/// Scores the plausibility of numeric clinical fields.
#[derive(Debug, Clone, Default)]
pub struct AccuracyChecker {
    rules: AccuracyRules,
}

impl AccuracyChecker {
    /// Create a checker.
    pub fn new(rules: AccuracyRules) -> Self {
        Self { rules }
    }

    /// Absent content scores 100: there is nothing to contradict.
    pub fn check(&self, content: Option<&CaseContent>) -> CheckOutcome {
        let Some(content) = content else {
            return CheckOutcome { score: 100, issues: Vec::new() };
        };

        let mut issues = Vec::new();
        let mut score: i32 = 100;

        if let Some(data) = content.clinical_data.as_ref() {
            score -= self.check_vital_signs(data, &mut issues);
            score -= self.check_laboratory(data, &mut issues);
        }
        score -= self.check_fever(content, &mut issues);

        CheckOutcome {
            score: score.clamp(0, 100) as u8,
            issues,
        }
    }

    fn check_vital_signs(&self, data: &ClinicalData, issues: &mut Vec<ValidationIssue>) -> i32 {
        let Some(vitals) = data.vital_signs.as_ref() else {
            return 0;
        };

        let mut penalty = 0;
        for (key, value) in vitals {
            // Only JSON numbers are checked; "120/80" style strings are skipped.
            let Some(value) = value.as_f64() else { continue };
            let Some(range) = self.rules.vital_sign(key) else { continue };
            if range.contains(value) {
                continue;
            }
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    format!("clinicalData.vitalSigns.{key}"),
                    format!(
                        "{key} ({value} {}) is outside the typical range ({}-{})",
                        range.unit, range.min, range.max
                    ),
                )
                .with_suggestion("Check that the value is clinically plausible"),
            );
            penalty += i32::from(self.rules.vital_sign_penalty);
        }
        penalty
    }

    fn check_laboratory(&self, data: &ClinicalData, issues: &mut Vec<ValidationIssue>) -> i32 {
        let Some(labs) = data.laboratory_results.as_ref() else {
            return 0;
        };

        let mut penalty = 0;
        for lab in labs {
            let Some(value) = leading_number(&lab.result) else { continue };
            let Some(range) = self.rules.laboratory(&lab.test) else { continue };
            if range.contains(value) {
                continue;
            }
            issues.push(
                ValidationIssue::new(
                    Severity::Info,
                    format!("clinicalData.laboratoryResults.{}", lab.test),
                    format!(
                        "{} ({} {}) is outside the typical range ({}-{})",
                        lab.test, lab.result, range.unit, range.min, range.max
                    ),
                )
                .with_suggestion("Check that the value is consistent with the presentation"),
            );
            penalty += i32::from(self.rules.laboratory_penalty);
        }
        penalty
    }

    fn check_fever(&self, content: &CaseContent, issues: &mut Vec<ValidationIssue>) -> i32 {
        let complaint = content
            .presentation
            .as_ref()
            .and_then(|p| p.chief_complaint.as_deref());
        let vitals = content
            .clinical_data
            .as_ref()
            .and_then(|d| d.vital_signs.as_ref());
        let (Some(complaint), Some(vitals)) = (complaint, vitals) else {
            return 0;
        };

        let complaint = complaint.to_lowercase();
        let mentions_fever = self
            .rules
            .fever_terms
            .iter()
            .any(|term| complaint.contains(&term.to_lowercase()));
        if !mentions_fever {
            return 0;
        }

        // A missing or zero temperature says nothing either way.
        let temperature = vitals
            .get(&self.rules.temperature_key)
            .and_then(|v| v.as_f64())
            .filter(|t| *t != 0.0);
        match temperature {
            Some(t) if t < self.rules.fever_min_temperature => {
                issues.push(
                    ValidationIssue::new(
                        Severity::Info,
                        format!("clinicalData.vitalSigns.{}", self.rules.temperature_key),
                        "fever complaint but temperature is not elevated",
                    )
                    .with_suggestion("Consider whether this is consistent with the presentation"),
                );
                i32::from(self.rules.fever_mismatch_penalty)
            }
            _ => 0,
        }
    }
}

/// Parse the leading decimal number of a free-text result ("12.5 g/dL" -> 12.5).
fn leading_number(text: &str) -> Option<f64> {
    static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    let re = NUMBER
        .get_or_init(|| Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").ok())
        .as_ref()?;
    re.find(text)?.as_str().trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use casegate_core::{LabResult, Presentation};
    use serde_json::json;

    fn with_vitals(vitals: &[(&str, serde_json::Value)]) -> CaseContent {
        let map: BTreeMap<String, serde_json::Value> = vitals
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        CaseContent {
            clinical_data: Some(ClinicalData {
                vital_signs: Some(map),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn lab(test: &str, result: &str) -> LabResult {
        LabResult {
            test: test.to_string(),
            result: result.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_content_scores_full() {
        let outcome = AccuracyChecker::default().check(None);
        assert_eq!(outcome.score, 100);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_out_of_range_vitals() {
        let content = with_vitals(&[
            ("Heart Rate", json!(180)),
            ("Temperature", json!(37.0)),
            ("SpO2", json!(70)),
        ]);
        let outcome = AccuracyChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 90);
        assert_eq!(outcome.issues.len(), 2);
        assert!(outcome.issues.iter().all(|i| i.severity == Severity::Warning));
        assert_eq!(outcome.issues[0].field, "clinicalData.vitalSigns.Heart Rate");
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let content = with_vitals(&[("Heart Rate", json!(40)), ("Temperature", json!(42))]);
        assert_eq!(AccuracyChecker::default().check(Some(&content)).score, 100);
    }

    #[test]
    fn test_non_numeric_and_unknown_vitals_are_ignored() {
        let content = with_vitals(&[
            ("Blood Pressure", json!("220/140")),
            ("Heart Rate", json!("999")),
            ("Pain Scale", json!(11)),
        ]);
        let outcome = AccuracyChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 100);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_lab_results() {
        let content = CaseContent {
            clinical_data: Some(ClinicalData {
                laboratory_results: Some(vec![
                    lab("Potassium", "6.8 mEq/L"),
                    lab("Sodium", "140"),
                    lab("WBC", "elevated"),
                    lab("Troponin", "5"),
                ]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let outcome = AccuracyChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 97);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].severity, Severity::Info);
        assert_eq!(outcome.issues[0].field, "clinicalData.laboratoryResults.Potassium");
    }

    #[test]
    fn test_fever_mismatch() {
        let mut content = with_vitals(&[("Temperature", json!(37.2))]);
        content.presentation = Some(Presentation {
            chief_complaint: Some("Fiebre y tos de 3 días".to_string()),
            ..Default::default()
        });
        let outcome = AccuracyChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 98);
        assert_eq!(outcome.issues[0].field, "clinicalData.vitalSigns.Temperature");

        let mut febrile = with_vitals(&[("Temperature", json!(39.1))]);
        febrile.presentation = content.presentation.clone();
        assert_eq!(AccuracyChecker::default().check(Some(&febrile)).score, 100);
    }

    #[test]
    fn test_fever_check_needs_a_temperature() {
        let mut content = with_vitals(&[("Heart Rate", json!(90))]);
        content.presentation = Some(Presentation {
            chief_complaint: Some("fever".to_string()),
            ..Default::default()
        });
        assert_eq!(AccuracyChecker::default().check(Some(&content)).score, 100);
    }

    #[test]
    fn test_negative_temperature_still_contradicts_fever() {
        let mut content = with_vitals(&[("Temperature", json!(-1.0))]);
        content.presentation = Some(Presentation {
            chief_complaint: Some("Fiebre".to_string()),
            ..Default::default()
        });
        let outcome = AccuracyChecker::default().check(Some(&content));
        // Out-of-range warning plus the fever mismatch.
        assert_eq!(outcome.score, 93);
        assert_eq!(outcome.issues.len(), 2);
        assert_eq!(outcome.issues[1].severity, Severity::Info);

        let mut zero = with_vitals(&[("Temperature", json!(0))]);
        zero.presentation = content.presentation.clone();
        // Only the range warning.
        assert_eq!(AccuracyChecker::default().check(Some(&zero)).score, 95);
    }

    #[test]
    fn test_range_lookup_is_exact() {
        let content = CaseContent {
            clinical_data: Some(ClinicalData {
                laboratory_results: Some(vec![lab("glucose", "300"), lab(" Glucose", "300")]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let outcome = AccuracyChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 100);
        assert!(outcome.issues.is_empty());

        let content = with_vitals(&[("heart rate", json!(180))]);
        assert_eq!(AccuracyChecker::default().check(Some(&content)).score, 100);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let rules = AccuracyRules {
            vital_sign_penalty: 60,
            ..Default::default()
        };
        let content = with_vitals(&[("Heart Rate", json!(10)), ("SpO2", json!(10))]);
        assert_eq!(AccuracyChecker::new(rules).check(Some(&content)).score, 0);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("12.5 g/dL"), Some(12.5));
        assert_eq!(leading_number("  -3"), Some(-3.0));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("1e3 cells"), Some(1000.0));
        assert_eq!(leading_number("high"), None);
        assert_eq!(leading_number(""), None);
    }
}
