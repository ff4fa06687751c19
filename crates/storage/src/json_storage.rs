//! JSON file storage implementation.
//!
//! Stores one JSON file per case under `cases/`, one file per audit comment
//! under `comments/<case-id>/`, and small per-case meta markers
//! (version + updated_at) under `meta/cases/`.

use std::path::{Path, PathBuf};
use casegate_core::{CaseComment, CaseFilter, CaseId, ClinicalCase};
use super::{CaseStore, Result};
use tokio::fs;

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, creating the directory layout under `root` if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("cases")).await?;
        fs::create_dir_all(root.join("comments")).await?;
        fs::create_dir_all(root.join("meta").join("cases")).await?;

        Ok(Self { root })
    }

    fn case_path(&self, id: CaseId) -> PathBuf {
        self.root.join("cases").join(format!("{}.json", id))
    }

    fn comment_dir(&self, case_id: CaseId) -> PathBuf {
        self.root.join("comments").join(case_id.to_string())
    }

    fn meta_path(&self, id: CaseId) -> PathBuf {
        self.root.join("meta").join("cases").join(format!("{}.meta.json", id))
    }

    /// Read and increment the per-case version, return the new version.
    async fn bump_version(&self, id: CaseId) -> Result<u64> {
        let path = self.meta_path(id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    /// Current stored version of a case, 0 when never saved.
    pub async fn version(&self, id: CaseId) -> Result<u64> {
        let meta: Option<serde_json::Value> = read_json(&self.meta_path(id)).await?;
        Ok(meta
            .and_then(|m| m.get("version").and_then(|v| v.as_u64()))
            .unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl CaseStore for JsonStorage {
    async fn save_case(&mut self, case: &ClinicalCase) -> Result<()> {
        let path = self.case_path(case.id);
        let json = serde_json::to_string_pretty(case)?;
        fs::write(&path, json.as_bytes()).await?;

        let version = self.bump_version(case.id).await?;
        tracing::debug!(case_id = %case.id, version, "saved case");
        Ok(())
    }

    async fn load_case(&self, id: CaseId) -> Result<Option<ClinicalCase>> {
        read_json(&self.case_path(id)).await
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<ClinicalCase>> {
        let mut cases: Vec<ClinicalCase> = list_dir(&self.root.join("cases")).await?;
        cases.retain(|case| filter.matches(case));
        cases.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(cases)
    }

    async fn append_comment(&mut self, comment: &CaseComment) -> Result<()> {
        let dir = self.comment_dir(comment.case_id);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.json", comment.id));
        let json = serde_json::to_string_pretty(comment)?;
        fs::write(&path, json.as_bytes()).await?;
        Ok(())
    }

    async fn list_comments(&self, case_id: CaseId) -> Result<Vec<CaseComment>> {
        let dir = self.comment_dir(case_id);
        if fs::metadata(&dir).await.is_err() {
            return Ok(Vec::new());
        }
        let mut comments: Vec<CaseComment> = list_dir(&dir).await?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => tracing::warn!(path = %entry.path().display(), error = %e, "skipping unreadable record"),
        }
    }
    Ok(items)
}
