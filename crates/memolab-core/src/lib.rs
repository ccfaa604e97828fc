//! Core types and traits for the memolab conversational memory labs

pub mod message;
pub mod provider;
pub mod snapshot;
pub mod store;

pub use message::{ChatMessage, Role};
pub use provider::{ModelError, ModelProvider, ModelResponse};
pub use snapshot::MemorySnapshot;
pub use store::{SnapshotStore, StoreError};
