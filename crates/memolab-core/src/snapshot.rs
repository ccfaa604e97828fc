//! Persisted memory state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// The on-disk shape of a session's memory: the rolling summary, the raw
/// turn buffer, and the slot map. All fields default so partial documents
/// from older runs still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub buffer: Vec<ChatMessage>,
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
}

impl MemorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.buffer.is_empty() && self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_loads_with_defaults() {
        let snapshot: MemorySnapshot =
            serde_json::from_str(r#"{"summary": "met the user"}"#).unwrap();
        assert_eq!(snapshot.summary, "met the user");
        assert!(snapshot.buffer.is_empty());
        assert!(snapshot.slots.is_empty());
    }

    #[test]
    fn test_full_document_round_trip() {
        let mut slots = BTreeMap::new();
        slots.insert("name".to_string(), "André".to_string());
        let snapshot = MemorySnapshot {
            summary: "s".to_string(),
            buffer: vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            slots,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: MemorySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_is_empty() {
        assert!(MemorySnapshot::default().is_empty());

        let mut snapshot = MemorySnapshot::default();
        snapshot.slots.insert("k".into(), "v".into());
        assert!(!snapshot.is_empty());
    }
}
