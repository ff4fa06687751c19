//! Required-section completeness check.

use casegate_core::rules::CompletenessRules;
use casegate_core::CaseContent;

/// The four sections every publishable case needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredSection {
    /// Chief complaint and demographics
    Presentation,
    /// Physical exam, vital signs or lab results
    ClinicalData,
    /// Question text plus enough options
    ClinicalQuestion,
    /// Key teaching points
    EducationalNotes,
}

impl RequiredSection {
    /// All sections in report order.
    pub const ALL: [RequiredSection; 4] = [
        RequiredSection::Presentation,
        RequiredSection::ClinicalData,
        RequiredSection::ClinicalQuestion,
        RequiredSection::EducationalNotes,
    ];

    /// Description used in the missing-field entry.
    pub fn describe(self, rules: &CompletenessRules) -> String {
        match self {
            Self::Presentation => {
                "patient presentation (chief complaint, demographics)".to_string()
            }
            Self::ClinicalData => {
                "clinical data (physical exam, vital signs or laboratory results)".to_string()
            }
            Self::ClinicalQuestion => format!(
                "clinical question with options (at least {} options)",
                rules.min_question_options
            ),
            Self::EducationalNotes => "educational notes (key points)".to_string(),
        }
    }
}

/// Outcome of the completeness check.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletenessOutcome {
    /// round(100 * present / 4)
    pub score: u8,
    /// Descriptions of the missing sections
    pub missing: Vec<String>,
}

impl CompletenessOutcome {
    /// Whether every required section is present.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Scores how many required sections a case has.
#[derive(Debug, Clone, Default)]
pub struct CompletenessChecker {
    rules: CompletenessRules,
}

impl CompletenessChecker {
    /// Create a checker.
    pub fn new(rules: CompletenessRules) -> Self {
        Self { rules }
    }

    /// Check content; absent content misses every section.
    pub fn check(&self, content: Option<&CaseContent>) -> CompletenessOutcome {
        let missing: Vec<String> = RequiredSection::ALL
            .into_iter()
            .filter(|section| !content.map_or(false, |c| self.has_section(c, *section)))
            .map(|section| section.describe(&self.rules))
            .collect();

        let total = RequiredSection::ALL.len();
        let present = total - missing.len();
        let score = (100.0 * present as f64 / total as f64).round() as u8;

        CompletenessOutcome { score, missing }
    }

    fn has_section(&self, content: &CaseContent, section: RequiredSection) -> bool {
        match section {
            RequiredSection::Presentation => content.presentation.as_ref().map_or(false, |p| {
                non_empty(p.chief_complaint.as_deref()) && p.demographics.is_some()
            }),
            // A vitals map or lab list counts once it is there, even empty.
            RequiredSection::ClinicalData => content.clinical_data.as_ref().map_or(false, |d| {
                non_empty(d.physical_examination.as_deref())
                    || d.vital_signs.is_some()
                    || d.laboratory_results.is_some()
            }),
            RequiredSection::ClinicalQuestion => {
                content.clinical_question.as_ref().map_or(false, |q| {
                    non_empty(q.question.as_deref())
                        && q.options.as_ref().map_or(0, Vec::len) >= self.rules.min_question_options
                })
            }
            RequiredSection::EducationalNotes => {
                content.educational_notes.as_ref().map_or(false, |n| {
                    n.key_points.as_ref().map_or(0, Vec::len) >= self.rules.min_key_points
                })
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> bool {
    value.map_or(false, |v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegate_core::{
        AnswerOption, ClinicalData, ClinicalQuestion, Demographics, EducationalNotes,
        Presentation,
    };

    fn option(id: &str) -> AnswerOption {
        AnswerOption {
            id: id.to_string(),
            text: format!("Option {id}"),
            is_correct: id == "a",
        }
    }

    fn complete_content() -> CaseContent {
        CaseContent {
            presentation: Some(Presentation {
                chief_complaint: Some("Dolor torácico".to_string()),
                demographics: Some(Demographics::default()),
                ..Default::default()
            }),
            clinical_data: Some(ClinicalData {
                physical_examination: Some("Taquicárdico".to_string()),
                ..Default::default()
            }),
            clinical_question: Some(ClinicalQuestion {
                question: Some("¿Cuál es el diagnóstico?".to_string()),
                options: Some(vec![option("a"), option("b")]),
                ..Default::default()
            }),
            educational_notes: Some(EducationalNotes {
                key_points: Some(vec!["ECG first".to_string()]),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_absent_content_misses_everything() {
        let outcome = CompletenessChecker::default().check(None);
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.missing.len(), 4);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_complete_content() {
        let content = complete_content();
        let outcome = CompletenessChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 100);
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_partial_content_scores_by_quarter() {
        let mut content = complete_content();
        content.educational_notes = None;
        content.presentation.as_mut().unwrap().demographics = None;

        let outcome = CompletenessChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.missing.len(), 2);
        assert!(outcome.missing[0].contains("presentation"));
        assert!(outcome.missing[1].contains("educational notes"));
    }

    #[test]
    fn test_question_needs_two_options() {
        let mut content = complete_content();
        content.clinical_question.as_mut().unwrap().options = Some(vec![option("a")]);

        let outcome = CompletenessChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 75);
        assert!(outcome.missing[0].contains("at least 2 options"));
    }

    #[test]
    fn test_clinical_data_accepts_any_one_source() {
        let mut content = complete_content();
        let mut vitals = std::collections::BTreeMap::new();
        vitals.insert("Heart Rate".to_string(), serde_json::json!(80));
        content.clinical_data = Some(ClinicalData {
            vital_signs: Some(vitals),
            ..Default::default()
        });
        assert!(CompletenessChecker::default().check(Some(&content)).is_complete());

        content.clinical_data = Some(ClinicalData::default());
        assert!(!CompletenessChecker::default().check(Some(&content)).is_complete());

        content.clinical_data = Some(ClinicalData {
            physical_examination: Some(String::new()),
            ..Default::default()
        });
        assert!(!CompletenessChecker::default().check(Some(&content)).is_complete());
    }

    #[test]
    fn test_empty_vitals_or_labs_still_count() {
        let mut content = complete_content();
        content.clinical_data = Some(ClinicalData {
            vital_signs: Some(Default::default()),
            ..Default::default()
        });
        assert_eq!(CompletenessChecker::default().check(Some(&content)).score, 100);

        content.clinical_data = Some(ClinicalData {
            laboratory_results: Some(Vec::new()),
            ..Default::default()
        });
        assert_eq!(CompletenessChecker::default().check(Some(&content)).score, 100);
    }

    #[test]
    fn test_only_empty_chief_complaint_counts_as_missing() {
        let mut content = complete_content();
        content.presentation.as_mut().unwrap().chief_complaint = Some("   ".to_string());
        assert_eq!(CompletenessChecker::default().check(Some(&content)).score, 100);

        content.presentation.as_mut().unwrap().chief_complaint = Some(String::new());
        assert_eq!(CompletenessChecker::default().check(Some(&content)).score, 75);
    }
}
