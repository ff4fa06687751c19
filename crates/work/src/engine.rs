//! Workflow engine.

use std::sync::Arc;

use casegate_core::rules::ScoreRules;
use casegate_core::{
    CaseComment, CaseId, CaseMutation, CaseStatus, Complexity, ReviewStatus, SubmissionCheck,
    ValidationReport, WorkflowResult, WorkflowStatusSummary,
};
use casegate_quality::ValidationEngine;
use casegate_storage::{CaseStore, StorageError};
use tokio::sync::Mutex;

use crate::action::{
    submission_reasons, ApproveCase, ArchiveCase, PublishCase, RejectCase, SubmitForReview,
    WorkflowAction,
};
use crate::error::{Result, WorkflowError};
use crate::queue::{QueuePriority, ReviewQueue};

/// Finite-state workflow over case status.
///
/// Each action holds the store lock from load to comment, and the case
/// update and its audit comment land together through
/// [`CaseStore::apply_action`] or not at all.
pub struct WorkflowEngine<S: CaseStore> {
    store: Arc<Mutex<S>>,
    rules: Arc<ScoreRules>,
}

impl<S: CaseStore> Clone for WorkflowEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            rules: Arc::clone(&self.rules),
        }
    }
}

impl<S: CaseStore> WorkflowEngine<S> {
    /// Create an engine over a store.
    pub fn new(store: S, rules: ScoreRules) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            rules: Arc::new(rules),
        }
    }

    /// Create an engine sharing an existing store handle.
    pub fn with_shared(store: Arc<Mutex<S>>, rules: Arc<ScoreRules>) -> Self {
        Self { store, rules }
    }

    /// The shared store handle.
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// The rules in force.
    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }

    // === Transition table ===

    /// Whether `from -> to` is allowed.
    pub fn can_transition(&self, from: CaseStatus, to: CaseStatus) -> bool {
        self.rules.workflow.transitions.can_transition(from, to)
    }

    /// Allowed next statuses.
    pub fn get_valid_transitions(&self, status: CaseStatus) -> Vec<CaseStatus> {
        self.rules.workflow.transitions.valid_transitions(status).to_vec()
    }

    /// Queue priority for a complexity and wait time.
    pub fn get_queue_priority(&self, complexity: Option<Complexity>, hours_in_queue: f64) -> f64 {
        QueuePriority::new(self.rules.queue.clone()).priority(complexity, hours_in_queue)
    }

    /// Review queue over the same store.
    pub fn review_queue(&self) -> ReviewQueue<S> {
        ReviewQueue::new(self.store(), Arc::clone(&self.rules))
    }

    // === Read paths ===

    /// Whether a case may be submitted, with every failing reason.
    pub async fn can_submit_for_review(&self, case_id: CaseId) -> Result<SubmissionCheck> {
        let store = self.store.lock().await;
        let reasons = match store.load_case(case_id).await? {
            Some(case) => submission_reasons(&case, &self.rules.workflow),
            None => vec!["case not found".to_string()],
        };
        Ok(SubmissionCheck::from_reasons(reasons))
    }

    /// Workflow view of a case; `None` when it does not exist.
    pub async fn get_workflow_status(
        &self,
        case_id: CaseId,
    ) -> Result<Option<WorkflowStatusSummary>> {
        let store = self.store.lock().await;
        let Some(case) = store.load_case(case_id).await? else {
            return Ok(None);
        };

        Ok(Some(WorkflowStatusSummary {
            current_status: case.status,
            valid_next_steps: self.get_valid_transitions(case.status),
            can_submit_for_review: submission_reasons(&case, &self.rules.workflow).is_empty(),
            can_approve: case.status == CaseStatus::InReview,
            can_publish: case.status == CaseStatus::Approved,
            review_status: ReviewStatus {
                submitted_at: case.submitted_for_review_at,
                submitted_by: case.submitted_for_review_by,
                reviewed_at: case.reviewed_at,
                reviewed_by: case.reviewed_by,
                published_at: case.published_at,
                published_by: case.published_by,
                archived_at: case.archived_at,
                archived_by: case.archived_by,
            },
        }))
    }

    /// A case's audit trail, oldest first.
    pub async fn list_comments(&self, case_id: CaseId) -> Result<Vec<CaseComment>> {
        Ok(self.store.lock().await.list_comments(case_id).await?)
    }

    // === Actions ===

    /// Validate a stored case and persist `validated` and the score.
    pub async fn record_validation(
        &self,
        case_id: CaseId,
        engine: &ValidationEngine,
    ) -> Result<ValidationReport> {
        let mut store = self.store.lock().await;
        let case = store
            .load_case(case_id)
            .await?
            .ok_or(WorkflowError::NotFound(case_id))?;

        let report = engine.validate_case(&case);
        store
            .update_case(case_id, &CaseMutation::validation(report.is_valid, report.score))
            .await
            .map_err(|e| not_found_or(e, case_id))?;

        tracing::info!(case_id = %case_id, score = report.score, valid = report.is_valid, "recorded validation");
        Ok(report)
    }

    /// DRAFT to IN_REVIEW.
    pub async fn submit_for_review(
        &self,
        case_id: CaseId,
        actor: &str,
        comment: Option<&str>,
    ) -> Result<WorkflowResult> {
        let action = SubmitForReview {
            comment: comment.map(str::to_string),
        };
        self.run(case_id, actor, &action).await
    }

    /// IN_REVIEW to APPROVED.
    pub async fn approve_case_for_review(
        &self,
        case_id: CaseId,
        actor: &str,
        comment: Option<&str>,
    ) -> Result<WorkflowResult> {
        let action = ApproveCase {
            comment: comment.map(str::to_string),
        };
        self.run(case_id, actor, &action).await
    }

    /// Reject an IN_REVIEW case.
    pub async fn reject_case(
        &self,
        case_id: CaseId,
        actor: &str,
        reason: &str,
        suggestions: &[String],
        return_to_draft: bool,
    ) -> Result<WorkflowResult> {
        let action = RejectCase {
            reason: reason.to_string(),
            suggestions: suggestions.to_vec(),
            return_to_draft,
        };
        self.run(case_id, actor, &action).await
    }

    /// APPROVED to PUBLISHED.
    pub async fn publish_case(
        &self,
        case_id: CaseId,
        actor: &str,
        description: Option<&str>,
    ) -> Result<WorkflowResult> {
        let action = PublishCase {
            description: description.map(str::to_string),
        };
        self.run(case_id, actor, &action).await
    }

    /// Any archivable status to ARCHIVED.
    pub async fn archive_case(
        &self,
        case_id: CaseId,
        actor: &str,
        reason: Option<&str>,
    ) -> Result<WorkflowResult> {
        let action = ArchiveCase {
            reason: reason.map(str::to_string),
        };
        self.run(case_id, actor, &action).await
    }

    /// Run an action: load, check, mutate, comment.
    pub async fn run<A: WorkflowAction + ?Sized>(
        &self,
        case_id: CaseId,
        actor: &str,
        action: &A,
    ) -> Result<WorkflowResult> {
        let mut store = self.store.lock().await;

        let Some(case) = store.load_case(case_id).await? else {
            tracing::warn!(case_id = %case_id, action = action.name(), "case not found");
            return Err(WorkflowError::NotFound(case_id));
        };

        if let Err(e) = action.precondition(&case, &self.rules.workflow) {
            tracing::warn!(
                case_id = %case_id,
                action = action.name(),
                status = %case.status,
                error = %e,
                "workflow action refused"
            );
            return Err(e);
        }

        let now = chrono::Utc::now();
        let mutation = action.apply(&case, actor, now);
        let comment = action.audit_comment().map(|text| {
            let mut comment = CaseComment::review(case_id, actor, text);
            comment.created_at = now;
            comment
        });
        let updated = store
            .apply_action(case_id, &mutation, comment.as_ref())
            .await
            .map_err(|e| not_found_or(e, case_id))?;

        tracing::info!(
            case_id = %case_id,
            action = action.name(),
            from = %case.status,
            to = %updated.status,
            actor,
            "workflow transition"
        );

        Ok(WorkflowResult {
            success: true,
            previous_status: case.status,
            new_status: updated.status,
            message: action.message(),
            case_id,
            timestamp: now,
        })
    }
}

/// A case vanishing between load and update is a normal not-found.
fn not_found_or(err: StorageError, case_id: CaseId) -> WorkflowError {
    match err {
        StorageError::NotFound(_) => WorkflowError::NotFound(case_id),
        other => WorkflowError::Storage(other),
    }
}
