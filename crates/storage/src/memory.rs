//! In-process storage backend.

use std::collections::BTreeMap;
use casegate_core::{CaseComment, CaseFilter, CaseId, ClinicalCase};
use super::{CaseStore, Result};

/// Keeps cases and comments in memory. Used by tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    cases: BTreeMap<CaseId, ClinicalCase>,
    comments: Vec<CaseComment>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with cases.
    pub fn with_cases(cases: impl IntoIterator<Item = ClinicalCase>) -> Self {
        Self {
            cases: cases.into_iter().map(|case| (case.id, case)).collect(),
            comments: Vec::new(),
        }
    }

    /// Every comment across all cases, in append order.
    pub fn comments(&self) -> &[CaseComment] {
        &self.comments
    }
}

#[async_trait::async_trait]
impl CaseStore for MemoryStorage {
    async fn save_case(&mut self, case: &ClinicalCase) -> Result<()> {
        self.cases.insert(case.id, case.clone());
        Ok(())
    }

    async fn load_case(&self, id: CaseId) -> Result<Option<ClinicalCase>> {
        Ok(self.cases.get(&id).cloned())
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<ClinicalCase>> {
        let mut cases: Vec<ClinicalCase> = self
            .cases
            .values()
            .filter(|case| filter.matches(case))
            .cloned()
            .collect();
        cases.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(cases)
    }

    async fn count_cases(&self, filter: &CaseFilter) -> Result<usize> {
        Ok(self.cases.values().filter(|case| filter.matches(case)).count())
    }

    async fn append_comment(&mut self, comment: &CaseComment) -> Result<()> {
        self.comments.push(comment.clone());
        Ok(())
    }

    async fn list_comments(&self, case_id: CaseId) -> Result<Vec<CaseComment>> {
        Ok(self
            .comments
            .iter()
            .filter(|c| c.case_id == case_id)
            .cloned()
            .collect())
    }
}
