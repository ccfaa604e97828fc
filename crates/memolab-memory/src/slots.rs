//! Slot memory: deterministic key-value facts

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// Last-write-wins fact store. Keys are ordered so prompt rendering and
/// persistence stay deterministic.
#[derive(Default)]
pub struct SlotMemory {
    slots: RwLock<BTreeMap<String, String>>,
}

impl SlotMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fact, overwriting any previous value for the slot.
    pub fn set(&self, slot: impl Into<String>, value: impl Into<String>) {
        self.slots.write().insert(slot.into(), value.into());
    }

    pub fn get(&self, slot: &str) -> Option<String> {
        self.slots.read().get(slot).cloned()
    }

    pub fn clear(&self) {
        self.slots.write().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.slots.read().clone()
    }

    pub fn restore(&self, slots: BTreeMap<String, String>) {
        *self.slots.write() = slots;
    }

    /// Renders `- slot: value` lines for the system prompt.
    pub fn as_text(&self) -> String {
        self.slots
            .read()
            .iter()
            .map(|(slot, value)| format!("- {}: {}", slot, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
