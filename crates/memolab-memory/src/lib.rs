//! Hybrid memory implementations for the memolab conversational memory labs
//!
//! Three pieces cooperate per turn: a rolling-summary memory buffers raw
//! turns and periodically compacts them into one summary string, a slot
//! memory holds explicit key-value facts extracted from user text, and a
//! hybrid session reconciles both into the request sent to the model.

mod extract;
mod session;
mod slots;
mod summarizer;
mod summary;

pub use extract::{ExtractionRule, PatternExtractor, SlotCandidate, SlotExtractor};
pub use session::{DEFAULT_SYSTEM_PROMPT, HybridSession, SessionError, TurnOutcome};
pub use slots::SlotMemory;
pub use summarizer::{DEFAULT_SUMMARY_PROMPT, ModelSummarizer, NoopSummarizer, Summarizer};
pub use summary::{CompactionResult, SummaryMemory, SummaryMemoryConfig};
