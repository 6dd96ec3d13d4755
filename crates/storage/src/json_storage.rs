//! JSON file storage implementation.
//!
//! Stores the completion set as a JSON array of course keys in
//! `<root>/completed.json` and keeps a small meta marker (version +
//! updated_at) under `<root>/meta/`.

use std::path::{Path, PathBuf};
use malla_core::CourseId;
use super::{ProgressStore, Result};
use tokio::fs;
use tracing::debug;

const COMPLETED_FILE: &str = "completed.json";
const COMPLETED_META: &str = "completed.meta.json";

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, making `root` and `root/meta` if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join("meta")).await?;

        Ok(Self { root })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn completed_path(&self) -> PathBuf {
        self.root.join(COMPLETED_FILE)
    }

    fn meta_path(&self) -> PathBuf {
        self.root.join("meta").join(COMPLETED_META)
    }

    /// Current meta version, 0 if never saved.
    pub async fn version(&self) -> u64 {
        match fs::read_to_string(self.meta_path()).await {
            Ok(s) => serde_json::from_str::<serde_json::Value>(&s)
                .ok()
                .and_then(|json| json.get("version").and_then(|v| v.as_u64()))
                .unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Read and increment the meta version, return the new version.
    async fn bump_version(&self) -> Result<u64> {
        let version = self.version().await + 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(self.meta_path(), serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }
}

#[async_trait::async_trait]
impl ProgressStore for JsonStorage {
    async fn load_completed(&self) -> Result<Option<Vec<CourseId>>> {
        read_json(&self.completed_path()).await
    }

    async fn save_completed(&mut self, completed: &[CourseId]) -> Result<()> {
        let json = serde_json::to_string_pretty(completed)?;
        fs::write(self.completed_path(), json.as_bytes()).await?;

        let version = self.bump_version().await?;
        debug!("Saved {} completed courses (version {})", completed.len(), version);
        Ok(())
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
