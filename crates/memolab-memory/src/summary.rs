//! Rolling summary memory: raw turn buffer with full-buffer compaction

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use memolab_core::{ChatMessage, ModelError};

use crate::summarizer::Summarizer;

/// Buffers raw user/assistant turns and, once the buffer holds
/// `2 * max_turn_pairs` messages, folds everything into a single summary
/// string. The summary is replaced on each compaction, never appended to.
pub struct SummaryMemory {
    summary: RwLock<String>,
    buffer: RwLock<Vec<ChatMessage>>,
    config: SummaryMemoryConfig,
    summarizer: Arc<dyn Summarizer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMemoryConfig {
    /// Buffered user/assistant pairs tolerated before compaction.
    #[serde(default = "default_max_turn_pairs")]
    pub max_turn_pairs: usize,
}

fn default_max_turn_pairs() -> usize {
    3
}

impl Default for SummaryMemoryConfig {
    fn default() -> Self {
        Self {
            max_turn_pairs: default_max_turn_pairs(),
        }
    }
}

/// What a compaction check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionResult {
    NotNeeded,
    Compacted { messages_summarized: usize },
}

impl SummaryMemory {
    pub fn new(summarizer: Arc<dyn Summarizer>, config: SummaryMemoryConfig) -> Self {
        Self {
            summary: RwLock::new(String::new()),
            buffer: RwLock::new(Vec::new()),
            config,
            summarizer,
        }
    }

    pub fn with_default_config(summarizer: Arc<dyn Summarizer>) -> Self {
        Self::new(summarizer, SummaryMemoryConfig::default())
    }

    pub fn config(&self) -> &SummaryMemoryConfig {
        &self.config
    }

    pub fn summary(&self) -> String {
        self.summary.read().clone()
    }

    pub fn buffer(&self) -> Vec<ChatMessage> {
        self.buffer.read().clone()
    }

    pub fn len(&self) -> usize {
        self.buffer.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.read().is_empty() && self.summary.read().is_empty()
    }

    /// Buffered message count that triggers compaction.
    pub fn threshold(&self) -> usize {
        self.config.max_turn_pairs * 2
    }

    pub fn needs_compaction(&self) -> bool {
        self.buffer.read().len() >= self.threshold()
    }

    pub fn add_user(&self, content: impl Into<String>) {
        self.buffer.write().push(ChatMessage::user(content));
    }

    pub fn add_assistant(&self, content: impl Into<String>) {
        self.buffer.write().push(ChatMessage::assistant(content));
    }

    pub fn clear(&self) {
        self.summary.write().clear();
        self.buffer.write().clear();
    }

    pub fn restore(&self, summary: String, buffer: Vec<ChatMessage>) {
        *self.summary.write() = summary;
        *self.buffer.write() = buffer;
    }

    /// Compacts when the deterministic threshold is met, otherwise does
    /// nothing.
    pub async fn maybe_compact(&self) -> Result<CompactionResult, ModelError> {
        if !self.needs_compaction() {
            return Ok(CompactionResult::NotNeeded);
        }
        self.compact().await
    }

    /// Folds the whole buffer into the summary. An empty buffer is a
    /// no-op without a summarizer call. On summarizer failure the buffer
    /// and summary are left untouched.
    pub async fn compact(&self) -> Result<CompactionResult, ModelError> {
        let turns = self.buffer.read().clone();
        if turns.is_empty() {
            return Ok(CompactionResult::NotNeeded);
        }
        let prior = self.summary.read().clone();

        let new_summary = self.summarizer.summarize(&prior, &turns).await?;

        *self.summary.write() = new_summary;
        {
            // Drain only what was summarized; messages appended during
            // the await survive.
            let mut buffer = self.buffer.write();
            let drained = turns.len().min(buffer.len());
            buffer.drain(..drained);
        }

        info!(messages = turns.len(), "compacted buffer into summary");
        Ok(CompactionResult::Compacted {
            messages_summarized: turns.len(),
        })
    }

    /// The request context: one system message holding the preamble and
    /// the current summary, then the buffered turns in order. No system
    /// message is emitted when both are empty.
    pub fn context_messages(&self, system_preamble: &str) -> Vec<ChatMessage> {
        let summary = self.summary.read();
        let buffer = self.buffer.read();

        let mut system = system_preamble.to_string();
        if !summary.is_empty() {
            if !system.is_empty() {
                system.push_str("\n\n");
            }
            system.push_str("Conversation summary so far:\n");
            system.push_str(&summary);
        }

        let mut messages = Vec::with_capacity(buffer.len() + 1);
        if !system.is_empty() {
            messages.push(ChatMessage::system(system));
        }
        messages.extend(buffer.iter().cloned());
        messages
    }
}
