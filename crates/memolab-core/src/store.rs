//! Storage trait for memory persistence

use async_trait::async_trait;
use thiserror::Error;

use crate::snapshot::MemorySnapshot;

/// Persistence backend for memory snapshots.
///
/// The built-in backend is `JsonFileStore`; implement this for anything
/// else (an in-memory store for tests, a database, ...).
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist the snapshot, atomically from the reader's point of view.
    async fn save(&self, snapshot: &MemorySnapshot) -> Result<(), StoreError>;
    /// Load the persisted snapshot. Returns `None` when nothing was saved yet.
    async fn load(&self) -> Result<Option<MemorySnapshot>, StoreError>;
    /// Remove the persisted snapshot. Missing data is not an error.
    async fn delete(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
