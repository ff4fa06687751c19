//! Review queue ordering.

use std::sync::Arc;

use casegate_core::rules::{QueueRules, ScoreRules};
use casegate_core::{CaseFilter, CaseId, CaseStatus, Complexity, Time};
use casegate_storage::CaseStore;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Result;

/// Sort key for cases waiting on a reviewer.
///
/// `weight(complexity) + (hours / 24) * boost`. Used only for ordering,
/// never for access control.
#[derive(Debug, Clone, Default)]
pub struct QueuePriority {
    rules: QueueRules,
}

impl QueuePriority {
    /// Create from queue weights.
    pub fn new(rules: QueueRules) -> Self {
        Self { rules }
    }

    /// Priority of a case. Negative hours pass straight through.
    pub fn priority(&self, complexity: Option<Complexity>, hours_in_queue: f64) -> f64 {
        self.rules.weight(complexity) + (hours_in_queue / 24.0) * self.rules.time_in_queue_boost
    }

    /// Priority from a raw complexity label; unknown labels get the default weight.
    pub fn priority_for_label(&self, complexity: &str, hours_in_queue: f64) -> f64 {
        self.priority(Complexity::parse_lenient(complexity), hours_in_queue)
    }
}

/// A pending case with its computed priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// Case being reviewed
    pub case_id: CaseId,
    /// Case title
    pub title: String,
    /// Complexity, if known
    pub complexity: Option<Complexity>,
    /// Submission time, or creation time for cases without one
    pub submitted_at: Time,
    /// Hours since `submitted_at`
    pub hours_waiting: f64,
    /// Sort key; higher is reviewed first
    pub priority: f64,
}

/// Queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    /// Cases in IN_REVIEW
    pub pending: usize,
    /// APPROVED cases at or above the publication threshold
    pub ready_to_publish: usize,
    /// Pending cases past the review time limit
    pub overdue: usize,
}

/// Read-only view of the review queue over a case store.
pub struct ReviewQueue<S: CaseStore> {
    store: Arc<Mutex<S>>,
    rules: Arc<ScoreRules>,
}

impl<S: CaseStore> ReviewQueue<S> {
    /// Create a queue view.
    pub fn new(store: Arc<Mutex<S>>, rules: Arc<ScoreRules>) -> Self {
        Self { store, rules }
    }

    /// Pending cases, highest priority first; ties go to the earlier submission.
    pub async fn entries(&self, now: Time) -> Result<Vec<QueueEntry>> {
        let pending = self
            .store
            .lock()
            .await
            .list_cases(&CaseFilter::with_status(CaseStatus::InReview))
            .await?;

        let priority = QueuePriority::new(self.rules.queue.clone());
        let mut entries: Vec<QueueEntry> = pending
            .into_iter()
            .map(|case| {
                let submitted_at = case.submitted_for_review_at.unwrap_or(case.created_at);
                let hours_waiting = hours_between(submitted_at, now);
                QueueEntry {
                    case_id: case.id,
                    priority: priority.priority(case.complexity, hours_waiting),
                    title: case.title,
                    complexity: case.complexity,
                    submitted_at,
                    hours_waiting,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.priority
                .total_cmp(&a.priority)
                .then(a.submitted_at.cmp(&b.submitted_at))
        });
        Ok(entries)
    }

    /// Counters for the review dashboard.
    pub async fn stats(&self, now: Time) -> Result<QueueStats> {
        let workflow = &self.rules.workflow;
        let store = self.store.lock().await;

        let pending = store
            .list_cases(&CaseFilter::with_status(CaseStatus::InReview))
            .await?;
        let ready_to_publish = store
            .list_cases(&CaseFilter::with_status(CaseStatus::Approved))
            .await?
            .iter()
            .filter(|case| workflow.is_ready_for_publication(case.status, case.validation_score))
            .count();

        let overdue = pending
            .iter()
            .filter(|case| {
                let since = case.submitted_for_review_at.unwrap_or(case.created_at);
                hours_between(since, now) > workflow.review_time_limit_hours
            })
            .count();

        Ok(QueueStats {
            pending: pending.len(),
            ready_to_publish,
            overdue,
        })
    }
}

fn hours_between(from: Time, to: Time) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}
