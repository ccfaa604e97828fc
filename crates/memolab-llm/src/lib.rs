//! Model providers for the memolab conversational memory labs

mod mock;
mod ollama;

pub use mock::ScriptedProvider;
pub use ollama::{DEFAULT_TIMEOUT, OllamaClient};
