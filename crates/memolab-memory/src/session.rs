//! Hybrid session: slots and rolling summary reconciled per turn

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use memolab_core::{
    ChatMessage, MemorySnapshot, ModelError, ModelProvider, SnapshotStore, StoreError,
};

use crate::extract::{PatternExtractor, SlotCandidate, SlotExtractor};
use crate::slots::SlotMemory;
use crate::summary::{CompactionResult, SummaryMemory};

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a concise, helpful assistant. Answer in at most two sentences.";

const FACTS_HEADER: &str = "Established facts about the user (authoritative; when the \
conversation or the summary disagrees with them, the facts win):";

/// A conversation with hybrid memory. Each turn runs a fixed pipeline:
/// slot extraction, forget handling, compaction check, model call, then
/// buffer update. A failed model call leaves every piece of memory as it
/// was before the turn.
pub struct HybridSession {
    provider: Arc<dyn ModelProvider>,
    memory: SummaryMemory,
    slots: SlotMemory,
    extractor: Box<dyn SlotExtractor>,
    store: Option<Arc<dyn SnapshotStore>>,
    system_prompt: String,
    forget_re: Regex,
}

/// Per-turn report handed back to the caller.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub content: String,
    pub model: String,
    pub elapsed: Duration,
    /// Slots set by extraction this turn, in application order.
    pub slots_set: Vec<SlotCandidate>,
    /// Whether this turn was a forget utterance.
    pub forgot: bool,
    /// Messages folded into the summary before the model call, 0 if none.
    pub compacted_messages: usize,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HybridSession {
    pub fn new(provider: Arc<dyn ModelProvider>, memory: SummaryMemory) -> Self {
        Self {
            provider,
            memory,
            slots: SlotMemory::new(),
            extractor: Box::new(PatternExtractor::new()),
            store: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            forget_re: Regex::new(r"(?i)\bforget\b").expect("valid built-in pattern"),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn SlotExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Override what counts as a forget utterance.
    pub fn with_forget_pattern(mut self, pattern: Regex) -> Self {
        self.forget_re = pattern;
        self
    }

    pub fn slots(&self) -> &SlotMemory {
        &self.slots
    }

    pub fn memory(&self) -> &SummaryMemory {
        &self.memory
    }

    /// Runs one turn. Memory is only mutated by the forget/compaction
    /// steps and, after a successful model call, by buffering the
    /// exchange.
    pub async fn respond(&self, user_text: &str) -> Result<TurnOutcome, SessionError> {
        let slots_set = self.apply_extraction(user_text);

        let forgot = self.forget_re.is_match(user_text);
        if forgot {
            info!("forget utterance, clearing slots and summary memory");
            self.slots.clear();
            self.memory.clear();
        }

        let compacted_messages = match self.memory.maybe_compact().await? {
            CompactionResult::Compacted {
                messages_summarized,
            } => messages_summarized,
            CompactionResult::NotNeeded => 0,
        };

        let messages = self.request_messages(user_text);
        let response = self.provider.complete(&messages).await?;

        self.memory.add_user(user_text);
        self.memory.add_assistant(&response.content);

        Ok(TurnOutcome {
            content: response.content,
            model: response.model,
            elapsed: response.elapsed,
            slots_set,
            forgot,
            compacted_messages,
        })
    }

    /// The exact message sequence a turn sends: system preamble (base
    /// prompt, facts block when slots exist, summary section when one
    /// exists), the buffered turns, then the user text.
    pub fn request_messages(&self, user_text: &str) -> Vec<ChatMessage> {
        let mut preamble = self.system_prompt.clone();
        if !self.slots.is_empty() {
            if !preamble.is_empty() {
                preamble.push_str("\n\n");
            }
            preamble.push_str(FACTS_HEADER);
            preamble.push('\n');
            preamble.push_str(&self.slots.as_text());
        }

        let mut messages = self.memory.context_messages(&preamble);
        messages.push(ChatMessage::user(user_text));
        messages
    }

    fn apply_extraction(&self, user_text: &str) -> Vec<SlotCandidate> {
        let candidates = self.extractor.extract(user_text);
        for candidate in &candidates {
            debug!(slot = %candidate.slot, value = %candidate.value, "slot set");
            self.slots.set(&candidate.slot, &candidate.value);
        }
        candidates
    }

    /// Current memory as a persistable snapshot.
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            summary: self.memory.summary(),
            buffer: self.memory.buffer(),
            slots: self.slots.to_map(),
        }
    }

    /// Persists the snapshot through the configured store and returns it.
    /// Without a store this only returns the snapshot.
    pub async fn save(&self) -> Result<MemorySnapshot, SessionError> {
        let snapshot = self.snapshot();
        if let Some(store) = &self.store {
            store.save(&snapshot).await?;
            info!(
                buffered = snapshot.buffer.len(),
                slots = snapshot.slots.len(),
                "memory saved"
            );
        }
        Ok(snapshot)
    }

    /// Loads the persisted snapshot into memory. Returns whether anything
    /// was restored; a missing artifact leaves the session empty.
    pub async fn restore(&self) -> Result<bool, SessionError> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        match store.load().await? {
            Some(snapshot) => {
                self.memory.restore(snapshot.summary, snapshot.buffer);
                self.slots.restore(snapshot.slots);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clears all memory and removes the persisted artifact.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.memory.clear();
        self.slots.clear();
        if let Some(store) = &self.store {
            store.delete().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::NoopSummarizer;
    use crate::summary::SummaryMemoryConfig;
    use memolab_core::Role;
    use memolab_llm::ScriptedProvider;
    use parking_lot::Mutex;

    struct MemoryStore {
        saved: Mutex<Option<MemorySnapshot>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                saved: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl SnapshotStore for MemoryStore {
        async fn save(&self, snapshot: &MemorySnapshot) -> Result<(), StoreError> {
            *self.saved.lock() = Some(snapshot.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Option<MemorySnapshot>, StoreError> {
            Ok(self.saved.lock().clone())
        }

        async fn delete(&self) -> Result<(), StoreError> {
            *self.saved.lock() = None;
            Ok(())
        }
    }

    fn make_session(provider: ScriptedProvider, max_turn_pairs: usize) -> HybridSession {
        let memory = SummaryMemory::new(
            Arc::new(NoopSummarizer),
            SummaryMemoryConfig { max_turn_pairs },
        );
        HybridSession::new(Arc::new(provider), memory)
    }

    fn system_of(messages: &[ChatMessage]) -> &str {
        assert_eq!(messages[0].role, Role::System);
        &messages[0].content
    }

    #[tokio::test]
    async fn test_recall_fact_lands_in_request() {
        let provider = ScriptedProvider::with_responses(["Nice to meet you, André!"]);
        let session = make_session(provider, 5);

        let outcome = session.respond("My name is André.").await.unwrap();
        assert_eq!(outcome.slots_set.len(), 1);
        assert_eq!(outcome.slots_set[0].value, "André");
        assert_eq!(session.slots().get("name").as_deref(), Some("André"));

        let messages = session.request_messages("What is my name?");
        assert!(system_of(&messages).contains("- name: André"));
        assert_eq!(messages.last().unwrap().content, "What is my name?");
    }

    #[tokio::test]
    async fn test_update_leaves_only_latest_value_in_facts() {
        let provider = ScriptedProvider::with_responses(["Hi André!", "Got it, Marc."]);
        let session = make_session(provider, 5);

        session.respond("My name is André.").await.unwrap();
        session.respond("Actually, my name is Marc.").await.unwrap();

        let messages = session.request_messages("What is my name?");
        let system = system_of(&messages);
        assert!(system.contains("- name: Marc"));
        assert!(!system.contains("- name: André"));
    }

    #[tokio::test]
    async fn test_forget_scrubs_every_trace_from_request() {
        let provider = ScriptedProvider::with_responses(["Hi André!", "All forgotten."]);
        let session = make_session(provider, 5);

        session.respond("My name is André.").await.unwrap();
        let outcome = session.respond("Forget everything about me.").await.unwrap();
        assert!(outcome.forgot);
        assert!(session.slots().is_empty());
        assert!(session.memory().summary().is_empty());

        let messages = session.request_messages("Do you know my name?");
        for message in &messages {
            assert!(!message.content.contains("André"));
        }
    }

    #[tokio::test]
    async fn test_forget_beats_extraction_in_same_turn() {
        let provider = ScriptedProvider::with_responses(["Done."]);
        let session = make_session(provider, 5);

        session
            .respond("Forget my name, it was never Marc.")
            .await
            .unwrap();
        assert!(session.slots().is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_summary_buffer_and_user_text() {
        let provider = ScriptedProvider::with_responses(["roger"]);
        let session = make_session(provider.clone(), 1);

        // One pair buffered, the next turn compacts it first.
        session.respond("I live in Lyon.").await.unwrap();
        let outcome = session.respond("And I like rain.").await.unwrap();
        assert_eq!(outcome.compacted_messages, 2);

        let sent = provider.last_call().unwrap();
        let system = system_of(&sent);
        assert!(system.contains("Conversation summary so far:"));
        assert!(system.contains("I live in Lyon."));
        assert_eq!(sent.last().unwrap().content, "And I like rain.");
    }

    #[tokio::test]
    async fn test_failed_model_call_mutates_nothing() {
        let provider = ScriptedProvider::with_responses(["Hi André!"]);
        let session = make_session(provider.clone(), 5);
        session.respond("My name is André.").await.unwrap();

        provider.set_error("model offline");
        let err = session.respond("Forge ahead?").await.unwrap_err();
        assert!(matches!(err, SessionError::Model(_)));

        // Buffer still holds only the successful exchange.
        assert_eq!(session.memory().len(), 2);
        assert_eq!(session.slots().get("name").as_deref(), Some("André"));
        assert!(session.memory().summary().is_empty());
    }

    #[tokio::test]
    async fn test_successful_turn_buffers_the_exchange() {
        let provider = ScriptedProvider::with_responses(["hello there"]);
        let session = make_session(provider, 5);

        session.respond("hi").await.unwrap();
        let buffer = session.memory().buffer();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer[0].role, Role::User);
        assert_eq!(buffer[0].content, "hi");
        assert_eq!(buffer[1].role, Role::Assistant);
        assert_eq!(buffer[1].content, "hello there");
    }

    #[tokio::test]
    async fn test_save_restore_round_trip_through_store() {
        let store = Arc::new(MemoryStore::new());
        let provider = ScriptedProvider::with_responses(["Hi André!"]);
        let session = make_session(provider, 5).with_store(store.clone());

        session.respond("My name is André.").await.unwrap();
        let saved = session.save().await.unwrap();
        assert_eq!(saved.slots.get("name").map(String::as_str), Some("André"));

        let fresh = make_session(ScriptedProvider::new(), 5).with_store(store);
        assert!(fresh.restore().await.unwrap());
        assert_eq!(fresh.slots().get("name").as_deref(), Some("André"));
        assert_eq!(fresh.memory().len(), 2);
    }

    #[tokio::test]
    async fn test_restore_without_artifact_stays_empty() {
        let store = Arc::new(MemoryStore::new());
        let session = make_session(ScriptedProvider::new(), 5).with_store(store);

        assert!(!session.restore().await.unwrap());
        assert!(session.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_memory_and_store() {
        let store = Arc::new(MemoryStore::new());
        let provider = ScriptedProvider::with_responses(["Hi!"]);
        let session = make_session(provider, 5).with_store(store.clone());

        session.respond("My name is André.").await.unwrap();
        session.save().await.unwrap();
        session.reset().await.unwrap();

        assert!(session.snapshot().is_empty());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_facts_block_absent_without_slots() {
        let provider = ScriptedProvider::new();
        let session = make_session(provider, 5);

        let messages = session.request_messages("hello");
        assert!(!system_of(&messages).contains("Established facts"));
    }

    #[tokio::test]
    async fn test_custom_forget_pattern() {
        let provider = ScriptedProvider::with_responses(["Hi!", "Wiped."]);
        let session = make_session(provider, 5)
            .with_forget_pattern(Regex::new(r"(?i)\bwipe\b").unwrap());

        session.respond("My name is André.").await.unwrap();
        // The default trigger word no longer clears anything.
        let outcome = session.respond("Forget it, keep going.").await.unwrap();
        assert!(!outcome.forgot);
        assert_eq!(session.slots().get("name").as_deref(), Some("André"));

        let outcome = session.respond("Please wipe my data.").await.unwrap();
        assert!(outcome.forgot);
        assert!(session.slots().is_empty());
    }
}
