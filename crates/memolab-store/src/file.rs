//! JSON file store with atomic replace

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use memolab_core::{MemorySnapshot, SnapshotStore, StoreError};

/// Persists one snapshot as pretty-printed JSON at a fixed path. Saves
/// write a sibling temp file first and rename it over the destination, so
/// a failed save never corrupts what was there before.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "memory.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn save(&self, snapshot: &MemorySnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let temp = self.temp_path();

        if let Err(e) = tokio::fs::write(&temp, json).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            // A failed save must not leave the temp artifact behind.
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "temp file cleanup failed");
            }
            return Err(e.into());
        }

        debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<MemorySnapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&self.path).await?;
        let snapshot = serde_json::from_str(&json)?;
        Ok(Some(snapshot))
    }

    async fn delete(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}
