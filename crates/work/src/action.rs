//! Workflow actions.
//!
//! Every action is the same small protocol: check the case against the
//! rules, describe the field changes, and optionally produce an audit
//! comment. The engine runs the protocol under the store lock.

use casegate_core::rules::WorkflowRules;
use casegate_core::{AuditStamp, CaseMutation, CaseStatus, ClinicalCase, Time};

use crate::error::{Result, WorkflowError};

/// One lifecycle action on a case.
pub trait WorkflowAction: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Status the case ends in, given its current status.
    fn target(&self, current: CaseStatus) -> CaseStatus;

    /// Check every business rule and transition the action depends on.
    fn precondition(&self, case: &ClinicalCase, rules: &WorkflowRules) -> Result<()>;

    /// Field changes to persist.
    fn apply(&self, case: &ClinicalCase, actor: &str, now: Time) -> CaseMutation;

    /// Audit comment to append, if any.
    fn audit_comment(&self) -> Option<String>;

    /// Human-readable outcome.
    fn message(&self) -> String;
}

fn ensure_transition(rules: &WorkflowRules, from: CaseStatus, to: CaseStatus) -> Result<()> {
    if rules.transitions.can_transition(from, to) {
        Ok(())
    } else {
        Err(WorkflowError::IllegalTransition { from, to })
    }
}

/// Optional free text, kept verbatim; blank counts as absent.
fn present(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.trim().is_empty())
}

/// Every reason `case` cannot be submitted for review, in check order.
pub fn submission_reasons(case: &ClinicalCase, rules: &WorkflowRules) -> Vec<String> {
    let mut reasons = Vec::new();

    if case.status != CaseStatus::Draft {
        reasons.push(format!("case must be in DRAFT, currently {}", case.status));
    }
    if case.content.as_ref().map_or(true, |c| c.is_empty()) {
        reasons.push("case must have content".to_string());
    }
    if case.title.trim().is_empty() {
        reasons.push("case must have a title".to_string());
    }
    if case.indication.trim().is_empty() {
        reasons.push("case must have a clinical indication".to_string());
    }
    if !case.validated {
        reasons.push("case must be validated before submission for review".to_string());
    }

    let required = rules.complexity_minimums.for_complexity(case.complexity);
    let score = case.score_or_zero();
    if score < required {
        reasons.push(format!(
            "insufficient validation score: {}/{}",
            score, required
        ));
    }

    reasons
}

/// DRAFT to IN_REVIEW.
#[derive(Debug, Clone, Default)]
pub struct SubmitForReview {
    /// Optional note stored verbatim
    pub comment: Option<String>,
}

impl WorkflowAction for SubmitForReview {
    fn name(&self) -> &'static str {
        "submit_for_review"
    }

    fn target(&self, _current: CaseStatus) -> CaseStatus {
        CaseStatus::InReview
    }

    fn precondition(&self, case: &ClinicalCase, rules: &WorkflowRules) -> Result<()> {
        let reasons = submission_reasons(case, rules);
        if !reasons.is_empty() {
            return Err(WorkflowError::Precondition { reasons });
        }
        ensure_transition(rules, case.status, CaseStatus::InReview)
    }

    fn apply(&self, _case: &ClinicalCase, actor: &str, now: Time) -> CaseMutation {
        CaseMutation {
            submitted_for_review: Some(AuditStamp::new(actor, now)),
            ..CaseMutation::status(CaseStatus::InReview)
        }
    }

    fn audit_comment(&self) -> Option<String> {
        present(&self.comment).map(str::to_string)
    }

    fn message(&self) -> String {
        "case submitted for review".to_string()
    }
}

/// IN_REVIEW to APPROVED.
///
/// Legality comes from the transition table, not a fixed source status.
#[derive(Debug, Clone, Default)]
pub struct ApproveCase {
    /// Optional reviewer note
    pub comment: Option<String>,
}

impl WorkflowAction for ApproveCase {
    fn name(&self) -> &'static str {
        "approve"
    }

    fn target(&self, _current: CaseStatus) -> CaseStatus {
        CaseStatus::Approved
    }

    fn precondition(&self, case: &ClinicalCase, rules: &WorkflowRules) -> Result<()> {
        ensure_transition(rules, case.status, CaseStatus::Approved)
    }

    fn apply(&self, _case: &ClinicalCase, actor: &str, now: Time) -> CaseMutation {
        CaseMutation {
            reviewed: Some(AuditStamp::new(actor, now)),
            ..CaseMutation::status(CaseStatus::Approved)
        }
    }

    fn audit_comment(&self) -> Option<String> {
        present(&self.comment).map(|c| format!("✓ APROBADO: {c}"))
    }

    fn message(&self) -> String {
        "case approved".to_string()
    }
}

/// Sends an IN_REVIEW case back, by default to DRAFT.
#[derive(Debug, Clone)]
pub struct RejectCase {
    /// Why the case was rejected
    pub reason: String,
    /// Improvement suggestions, kept verbatim; blank entries are ignored
    pub suggestions: Vec<String>,
    /// Move the case to DRAFT, or leave it where it is
    pub return_to_draft: bool,
}

impl RejectCase {
    /// Reject with a reason, returning the case to draft.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            suggestions: Vec::new(),
            return_to_draft: true,
        }
    }

    /// Attach suggestions.
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = String>) -> Self {
        self.suggestions = suggestions.into_iter().collect();
        self
    }

    /// Keep the current status instead of returning to draft.
    pub fn keep_status(mut self) -> Self {
        self.return_to_draft = false;
        self
    }

    fn suggestions(&self) -> impl Iterator<Item = &str> {
        self.suggestions
            .iter()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

impl WorkflowAction for RejectCase {
    fn name(&self) -> &'static str {
        "reject"
    }

    fn target(&self, current: CaseStatus) -> CaseStatus {
        if self.return_to_draft {
            CaseStatus::Draft
        } else {
            current
        }
    }

    fn precondition(&self, case: &ClinicalCase, rules: &WorkflowRules) -> Result<()> {
        // Exact status match, stricter than the transition table.
        if case.status != CaseStatus::InReview {
            return Err(WorkflowError::Precondition {
                reasons: vec![format!(
                    "only cases in IN_REVIEW can be rejected, currently {}",
                    case.status
                )],
            });
        }
        if self.reason.trim().is_empty() {
            return Err(WorkflowError::EmptyReason);
        }
        let given = self.suggestions().count();
        if given > rules.max_suggestions {
            return Err(WorkflowError::TooManySuggestions {
                max: rules.max_suggestions,
                given,
            });
        }
        if self.return_to_draft {
            ensure_transition(rules, case.status, CaseStatus::Draft)?;
        }
        Ok(())
    }

    fn apply(&self, case: &ClinicalCase, _actor: &str, _now: Time) -> CaseMutation {
        CaseMutation::status(self.target(case.status))
    }

    fn audit_comment(&self) -> Option<String> {
        let mut lines = vec![format!("✗ RECHAZADO: {}", self.reason)];
        let mut suggestions = self.suggestions().peekable();
        if suggestions.peek().is_some() {
            lines.push("Sugerencias:".to_string());
            lines.extend(suggestions.map(|s| format!("• {s}")));
        }
        Some(lines.join("\n"))
    }

    fn message(&self) -> String {
        if self.return_to_draft {
            "case rejected and returned to DRAFT".to_string()
        } else {
            "case rejected, status unchanged".to_string()
        }
    }
}

/// APPROVED to PUBLISHED.
#[derive(Debug, Clone, Default)]
pub struct PublishCase {
    /// Optional publication note
    pub description: Option<String>,
}

impl WorkflowAction for PublishCase {
    fn name(&self) -> &'static str {
        "publish"
    }

    fn target(&self, _current: CaseStatus) -> CaseStatus {
        CaseStatus::Published
    }

    fn precondition(&self, case: &ClinicalCase, rules: &WorkflowRules) -> Result<()> {
        // Score first, whatever the status.
        let required = rules.publication_threshold;
        if case.score_or_zero() < required {
            return Err(WorkflowError::InsufficientScore {
                score: case.validation_score,
                required,
            });
        }
        ensure_transition(rules, case.status, CaseStatus::Published)
    }

    fn apply(&self, _case: &ClinicalCase, actor: &str, now: Time) -> CaseMutation {
        CaseMutation {
            published: Some(AuditStamp::new(actor, now)),
            ..CaseMutation::status(CaseStatus::Published)
        }
    }

    fn audit_comment(&self) -> Option<String> {
        present(&self.description).map(|d| format!("📢 PUBLICADO: {d}"))
    }

    fn message(&self) -> String {
        "case published".to_string()
    }
}

/// Any archivable status to ARCHIVED.
#[derive(Debug, Clone, Default)]
pub struct ArchiveCase {
    /// Optional archival reason
    pub reason: Option<String>,
}

impl WorkflowAction for ArchiveCase {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn target(&self, _current: CaseStatus) -> CaseStatus {
        CaseStatus::Archived
    }

    fn precondition(&self, case: &ClinicalCase, rules: &WorkflowRules) -> Result<()> {
        ensure_transition(rules, case.status, CaseStatus::Archived)
    }

    fn apply(&self, _case: &ClinicalCase, actor: &str, now: Time) -> CaseMutation {
        CaseMutation {
            archived: Some(AuditStamp::new(actor, now)),
            ..CaseMutation::status(CaseStatus::Archived)
        }
    }

    fn audit_comment(&self) -> Option<String> {
        present(&self.reason).map(|r| format!("🗃️ ARCHIVADO: {r}"))
    }

    fn message(&self) -> String {
        "case archived".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegate_core::{CaseContent, Complexity, EducationalNotes};

    fn draft(complexity: Option<Complexity>, score: Option<u8>) -> ClinicalCase {
        let mut case = ClinicalCase::new("Dolor torácico", "Síndrome coronario agudo", complexity)
            .with_content(CaseContent {
                educational_notes: Some(EducationalNotes::default()),
                ..Default::default()
            });
        case.validated = true;
        case.validation_score = score;
        case
    }

    fn in_status(status: CaseStatus, score: Option<u8>) -> ClinicalCase {
        let mut case = draft(Some(Complexity::Basic), score);
        case.status = status;
        case
    }

    #[test]
    fn test_submission_reasons_collects_everything() {
        let mut case = ClinicalCase::new(" ", "", None);
        case.status = CaseStatus::Approved;

        let reasons = submission_reasons(&case, &WorkflowRules::default());
        assert_eq!(reasons.len(), 6);
        assert_eq!(reasons[0], "case must be in DRAFT, currently APPROVED");
        assert_eq!(reasons[5], "insufficient validation score: 0/60");
    }

    #[test]
    fn test_complexity_minimums_are_inclusive() {
        let rules = WorkflowRules::default();
        for (complexity, min) in [
            (Some(Complexity::Basic), 60),
            (Some(Complexity::Intermediate), 70),
            (Some(Complexity::Advanced), 80),
            (None, 60),
        ] {
            assert!(SubmitForReview::default()
                .precondition(&draft(complexity, Some(min)), &rules)
                .is_ok());
            let err = SubmitForReview::default()
                .precondition(&draft(complexity, Some(min - 1)), &rules)
                .unwrap_err();
            assert!(matches!(err, WorkflowError::Precondition { .. }));
        }
    }

    #[test]
    fn test_submit_needs_a_score() {
        let err = SubmitForReview::default()
            .precondition(&draft(Some(Complexity::Basic), None), &WorkflowRules::default())
            .unwrap_err();
        assert!(err.to_string().contains("insufficient validation score"));
    }

    #[test]
    fn test_submit_without_transition_in_table() {
        let mut rules = WorkflowRules::default();
        rules.transitions.0.insert(CaseStatus::Draft, vec![CaseStatus::Archived]);

        let err = SubmitForReview::default()
            .precondition(&draft(Some(Complexity::Basic), Some(90)), &rules)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
    }

    #[test]
    fn test_approve_follows_transition_table() {
        let rules = WorkflowRules::default();
        assert!(ApproveCase::default()
            .precondition(&in_status(CaseStatus::InReview, None), &rules)
            .is_ok());
        assert!(ApproveCase::default()
            .precondition(&in_status(CaseStatus::Draft, None), &rules)
            .is_err());

        let mut widened = rules.clone();
        widened
            .transitions
            .0
            .insert(CaseStatus::Draft, vec![CaseStatus::Approved]);
        assert!(ApproveCase::default()
            .precondition(&in_status(CaseStatus::Draft, None), &widened)
            .is_ok());
    }

    #[test]
    fn test_reject_is_exactly_in_review() {
        let rules = WorkflowRules::default();
        let action = RejectCase::new("Falta ECG");

        assert!(action.precondition(&in_status(CaseStatus::InReview, None), &rules).is_ok());
        for status in [CaseStatus::Draft, CaseStatus::Approved, CaseStatus::Published] {
            let err = action.precondition(&in_status(status, None), &rules).unwrap_err();
            assert!(matches!(err, WorkflowError::Precondition { .. }));
        }
    }

    #[test]
    fn test_reject_reason_and_suggestions() {
        let rules = WorkflowRules::default();
        let case = in_status(CaseStatus::InReview, None);

        let err = RejectCase::new("   ").precondition(&case, &rules).unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyReason));

        let six: Vec<String> = (0..6).map(|i| format!("s{i}")).collect();
        let err = RejectCase::new("r")
            .with_suggestions(six)
            .precondition(&case, &rules)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::TooManySuggestions { max: 5, given: 6 }));

        let padded: Vec<String> = vec!["a".into(), "".into(), "  ".into(), "b".into(), "c".into(), "d".into(), "e".into()];
        assert!(RejectCase::new("r").with_suggestions(padded).precondition(&case, &rules).is_ok());
    }

    #[test]
    fn test_reject_comment_format() {
        let action = RejectCase::new("Explicación incompleta")
            .with_suggestions(["Citar guía".to_string(), " ".to_string(), "Añadir ECG".to_string()]);
        assert_eq!(
            action.audit_comment().unwrap(),
            "✗ RECHAZADO: Explicación incompleta\nSugerencias:\n• Citar guía\n• Añadir ECG"
        );
        assert_eq!(
            RejectCase::new("Breve").audit_comment().unwrap(),
            "✗ RECHAZADO: Breve"
        );
    }

    #[test]
    fn test_reject_target() {
        assert_eq!(RejectCase::new("r").target(CaseStatus::InReview), CaseStatus::Draft);
        assert_eq!(
            RejectCase::new("r").keep_status().target(CaseStatus::InReview),
            CaseStatus::InReview
        );
    }

    #[test]
    fn test_publish_checks_score_before_status() {
        let rules = WorkflowRules::default();

        let err = PublishCase::default()
            .precondition(&in_status(CaseStatus::Approved, Some(84)), &rules)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InsufficientScore { score: Some(84), required: 85 }));

        assert!(PublishCase::default()
            .precondition(&in_status(CaseStatus::Approved, Some(85)), &rules)
            .is_ok());

        // Draft with a low score reports the score, not the transition.
        let err = PublishCase::default()
            .precondition(&in_status(CaseStatus::Draft, Some(10)), &rules)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InsufficientScore { .. }));

        let err = PublishCase::default()
            .precondition(&in_status(CaseStatus::Draft, Some(95)), &rules)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
    }

    #[test]
    fn test_archive_from_each_status() {
        let rules = WorkflowRules::default();
        for status in [
            CaseStatus::Draft,
            CaseStatus::InReview,
            CaseStatus::Approved,
            CaseStatus::Published,
        ] {
            assert!(ArchiveCase::default().precondition(&in_status(status, None), &rules).is_ok());
        }
        assert!(ArchiveCase::default()
            .precondition(&in_status(CaseStatus::Archived, None), &rules)
            .is_err());
    }

    #[test]
    fn test_comment_prefixes() {
        let approve = ApproveCase { comment: Some("Bien".into()) };
        assert_eq!(approve.audit_comment().unwrap(), "✓ APROBADO: Bien");

        let publish = PublishCase { description: Some("Cohorte 2026".into()) };
        assert_eq!(publish.audit_comment().unwrap(), "📢 PUBLICADO: Cohorte 2026");

        let archive = ArchiveCase { reason: Some("Obsoleto".into()) };
        assert_eq!(archive.audit_comment().unwrap(), "🗃️ ARCHIVADO: Obsoleto");

        let submit = SubmitForReview { comment: Some("Listo".into()) };
        assert_eq!(submit.audit_comment().unwrap(), "Listo");

        assert!(ApproveCase { comment: Some("  ".into()) }.audit_comment().is_none());
        assert!(ArchiveCase::default().audit_comment().is_none());
    }

    #[test]
    fn test_comment_text_kept_verbatim() {
        let submit = SubmitForReview { comment: Some("  Listo\n".into()) };
        assert_eq!(submit.audit_comment().unwrap(), "  Listo\n");

        let approve = ApproveCase { comment: Some(" Bien ".into()) };
        assert_eq!(approve.audit_comment().unwrap(), "✓ APROBADO:  Bien ");

        let reject = RejectCase::new(" Falta ECG ")
            .with_suggestions(["  Citar guía".to_string(), "\t".to_string()]);
        assert_eq!(
            reject.audit_comment().unwrap(),
            "✗ RECHAZADO:  Falta ECG \nSugerencias:\n•   Citar guía"
        );
    }

    #[test]
    fn test_apply_stamps_actor() {
        let now = chrono::Utc::now();
        let case = in_status(CaseStatus::Approved, Some(90));
        let mutation = PublishCase::default().apply(&case, "editor", now);
        assert_eq!(mutation.status, Some(CaseStatus::Published));
        assert_eq!(mutation.published, Some(AuditStamp::new("editor", now)));
        assert!(mutation.reviewed.is_none());
    }
}
