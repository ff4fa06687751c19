//! Case store trait abstraction.

use async_trait::async_trait;
use casegate_core::{CaseComment, CaseFilter, CaseId, CaseMutation, ClinicalCase};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Persistent store for cases and their audit trail.
///
/// The workflow engine serializes its own actions; a backend shared with
/// other writers must make `update_case` atomic on its side.
#[async_trait]
pub trait CaseStore: Send + Sync {
    // === Case operations ===

    /// Save a case (create or replace).
    async fn save_case(&mut self, case: &ClinicalCase) -> Result<()>;

    /// Load a case by ID.
    async fn load_case(&self, id: CaseId) -> Result<Option<ClinicalCase>>;

    /// List cases matching the filter.
    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<ClinicalCase>>;

    /// Count cases matching the filter.
    async fn count_cases(&self, filter: &CaseFilter) -> Result<usize> {
        Ok(self.list_cases(filter).await?.len())
    }

    /// Apply a field-level update and return the stored result.
    async fn update_case(&mut self, id: CaseId, mutation: &CaseMutation) -> Result<ClinicalCase> {
        let mut case = self
            .load_case(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("case {id}")))?;
        mutation.apply_to(&mut case, chrono::Utc::now());
        self.save_case(&case).await?;
        Ok(case)
    }

    /// Apply an update and its audit comment as one unit.
    ///
    /// If the comment cannot be written the previous case is saved back
    /// and the comment error is returned.
    async fn apply_action(
        &mut self,
        id: CaseId,
        mutation: &CaseMutation,
        comment: Option<&CaseComment>,
    ) -> Result<ClinicalCase> {
        let previous = self
            .load_case(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("case {id}")))?;
        let updated = self.update_case(id, mutation).await?;

        let Some(comment) = comment else {
            return Ok(updated);
        };
        if let Err(err) = self.append_comment(comment).await {
            if let Err(restore) = self.save_case(&previous).await {
                tracing::error!(case_id = %id, error = %restore, "failed to restore case after comment error");
            }
            return Err(err);
        }
        Ok(updated)
    }

    // === Audit trail ===

    /// Append a comment. Comments are never updated or deleted.
    async fn append_comment(&mut self, comment: &CaseComment) -> Result<()>;

    /// List a case's comments, oldest first.
    async fn list_comments(&self, case_id: CaseId) -> Result<Vec<CaseComment>>;
}
