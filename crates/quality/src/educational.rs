//! Educational quality scoring.

use casegate_core::rules::QualityRules;
use casegate_core::{CaseContent, Severity, ValidationIssue};

/// Score plus findings from one checker.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// 0-100
    pub score: u8,
    /// Findings, each already carrying its severity
    pub issues: Vec<ValidationIssue>,
}

/// Scores the teaching material: question, explanation, notes, options, references.
#[derive(Debug, Clone, Default)]
pub struct QualityChecker {
    rules: QualityRules,
}

impl QualityChecker {
    /// Create a checker.
    pub fn new(rules: QualityRules) -> Self {
        Self { rules }
    }

    /// Absent content scores 0 without findings; completeness reports it.
    pub fn check(&self, content: Option<&CaseContent>) -> CheckOutcome {
        let Some(content) = content else {
            return CheckOutcome { score: 0, issues: Vec::new() };
        };

        let r = &self.rules;
        let question = content.clinical_question.as_ref();
        let notes = content.educational_notes.as_ref();
        let mut issues = Vec::new();
        let mut score: i32 = 100;

        let question_len = question
            .and_then(|q| q.question.as_deref())
            .map_or(0, |q| q.chars().count());
        if question_len < r.question_min_chars {
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "clinicalQuestion.question",
                    format!("clinical question is too short (under {} characters)", r.question_min_chars),
                )
                .with_suggestion("Expand the question for clarity"),
            );
            score -= i32::from(r.short_question_penalty);
        } else if question_len > r.question_max_chars {
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "clinicalQuestion.question",
                    format!("clinical question is too long (over {} characters)", r.question_max_chars),
                )
                .with_suggestion("Simplify the question while keeping its core"),
            );
            score -= i32::from(r.long_question_penalty);
        }

        let explanation_len = question
            .and_then(|q| q.explanation.as_deref())
            .map_or(0, |e| e.chars().count());
        if explanation_len < r.explanation_min_chars {
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "clinicalQuestion.explanation",
                    format!("explanation is too brief (under {} characters)", r.explanation_min_chars),
                )
                .with_suggestion("Explain the diagnosis or management in more detail"),
            );
            score -= i32::from(r.short_explanation_penalty);
        }

        let key_points = notes.and_then(|n| n.key_points.as_ref()).map_or(0, Vec::len);
        if key_points < r.min_key_points {
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "educationalNotes.keyPoints",
                    format!("at least {} key teaching points are required", r.min_key_points),
                )
                .with_suggestion("Add more key points relevant to the case"),
            );
            score -= i32::from(r.few_key_points_penalty);
        }

        let mistakes = notes.and_then(|n| n.common_mistakes.as_ref()).map_or(0, Vec::len);
        if mistakes == 0 {
            issues.push(
                ValidationIssue::new(
                    Severity::Info,
                    "educationalNotes.commonMistakes",
                    "no common mistakes documented",
                )
                .with_suggestion("Consider listing common mistakes to strengthen the teaching"),
            );
            score -= i32::from(r.missing_mistakes_penalty);
        }

        let options = question.and_then(|q| q.options.as_ref()).map_or(0, Vec::len);
        if options < r.recommended_options {
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "clinicalQuestion.options",
                    format!("only {} option(s); {} are recommended", options, r.recommended_options),
                )
                .with_suggestion("Add realistic distractor options"),
            );
            score -= i32::from(r.few_options_penalty);
        }

        let references = question.and_then(|q| q.references.as_ref()).map_or(0, Vec::len);
        if references == 0 {
            issues.push(
                ValidationIssue::new(
                    Severity::Info,
                    "clinicalQuestion.references",
                    "no bibliographic references",
                )
                .with_suggestion("Add relevant medical references"),
            );
            score -= i32::from(r.missing_references_penalty);
        }

        CheckOutcome {
            score: score.clamp(0, 100) as u8,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegate_core::{AnswerOption, ClinicalQuestion, EducationalNotes, Reference};

    fn options(n: usize) -> Vec<AnswerOption> {
        (0..n)
            .map(|i| AnswerOption {
                id: i.to_string(),
                text: format!("Option {i}"),
                is_correct: i == 0,
            })
            .collect()
    }

    fn polished_content(question: &str) -> CaseContent {
        CaseContent {
            clinical_question: Some(ClinicalQuestion {
                question: Some(question.to_string()),
                options: Some(options(4)),
                explanation: Some("x".repeat(60)),
                references: Some(vec![Reference {
                    kind: "guideline".to_string(),
                    section: "2.1".to_string(),
                    quote: None,
                }]),
                ..Default::default()
            }),
            educational_notes: Some(EducationalNotes {
                key_points: Some(vec!["one".to_string(), "two".to_string()]),
                common_mistakes: Some(vec!["anchoring".to_string()]),
                clinical_tips: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_content_scores_zero_silently() {
        let outcome = QualityChecker::default().check(None);
        assert_eq!(outcome.score, 0);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_polished_content_scores_full() {
        let content = polished_content(&"q".repeat(40));
        let outcome = QualityChecker::default().check(Some(&content));
        assert_eq!(outcome.score, 100);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_question_length_boundary() {
        let checker = QualityChecker::default();

        let short = polished_content(&"q".repeat(19));
        let outcome = checker.check(Some(&short));
        assert_eq!(outcome.score, 85);
        assert_eq!(outcome.issues[0].field, "clinicalQuestion.question");

        let exact = polished_content(&"q".repeat(20));
        assert_eq!(checker.check(Some(&exact)).score, 100);
    }

    #[test]
    fn test_overlong_question() {
        let content = polished_content(&"q".repeat(501));
        assert_eq!(QualityChecker::default().check(Some(&content)).score, 90);
    }

    #[test]
    fn test_question_length_counts_characters() {
        // 20 characters, more than 20 bytes
        let content = polished_content("¿Cuál es el manejo?ñ");
        assert_eq!(QualityChecker::default().check(Some(&content)).score, 100);
    }

    #[test]
    fn test_empty_sections_accumulate_penalties() {
        let content = CaseContent::default();
        let outcome = QualityChecker::default().check(Some(&content));
        // 15 + 20 + 15 + 5 + 10 + 5
        assert_eq!(outcome.score, 30);
        assert_eq!(outcome.issues.len(), 6);

        let infos = outcome.issues.iter().filter(|i| i.severity == Severity::Info).count();
        assert_eq!(infos, 2);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let rules = QualityRules {
            short_question_penalty: 90,
            short_explanation_penalty: 90,
            ..Default::default()
        };
        let outcome = QualityChecker::new(rules).check(Some(&CaseContent::default()));
        assert_eq!(outcome.score, 0);
    }
}
