//! Session wiring shared by the subcommands

use std::sync::Arc;
use std::time::Duration;

use memolab_core::ModelProvider;
use memolab_llm::OllamaClient;
use memolab_memory::{HybridSession, ModelSummarizer, SummaryMemory, SummaryMemoryConfig};
use memolab_store::JsonFileStore;
use tracing::debug;

use crate::SessionOpts;

pub fn build_provider(opts: &SessionOpts) -> Arc<dyn ModelProvider> {
    Arc::new(
        OllamaClient::new(&opts.model)
            .with_binary(&opts.ollama_bin)
            .with_timeout(Duration::from_secs(opts.timeout_secs)),
    )
}

/// Session without persistence. `eval` uses this directly so the checks
/// never disturb the chat memory file.
pub fn build_session(provider: Arc<dyn ModelProvider>, opts: &SessionOpts) -> HybridSession {
    let summarizer = Arc::new(ModelSummarizer::new(provider.clone()));
    let memory = SummaryMemory::new(
        summarizer,
        SummaryMemoryConfig {
            max_turn_pairs: opts.buffer_pairs,
        },
    );
    HybridSession::new(provider, memory)
}

/// The chat session: the same wiring plus the JSON file store.
pub fn build_chat_session(opts: &SessionOpts) -> HybridSession {
    debug!(
        model = %opts.model,
        memory_file = %opts.memory_file.display(),
        "building chat session"
    );
    let provider = build_provider(opts);
    let store = Arc::new(JsonFileStore::new(&opts.memory_file));
    build_session(provider, opts).with_store(store)
}
