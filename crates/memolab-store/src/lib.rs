//! Snapshot persistence for the memolab conversational memory labs

mod file;

pub use file::JsonFileStore;
