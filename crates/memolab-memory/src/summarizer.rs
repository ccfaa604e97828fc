//! Summarizer trait and implementations for memory compaction

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use memolab_core::{ChatMessage, ModelError, ModelProvider};

/// Produces the replacement summary for a compaction: one string folding
/// the prior summary and the buffered turns together.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        prior_summary: &str,
        turns: &[ChatMessage],
    ) -> Result<String, ModelError>;
}

pub const DEFAULT_SUMMARY_PROMPT: &str = r#"You maintain the running summary of a conversation.

Current summary:
{summary}

New conversation turns:
{conversation}

Rewrite the summary so it covers both the current summary and the new turns. Keep it to two or three sentences and preserve names, stated preferences, and decisions. Reply with the summary only."#;

/// Asks a model provider for the combined summary.
pub struct ModelSummarizer {
    provider: Arc<dyn ModelProvider>,
    prompt_template: String,
}

impl ModelSummarizer {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            prompt_template: DEFAULT_SUMMARY_PROMPT.to_string(),
        }
    }

    /// Override the template. `{summary}` and `{conversation}` are
    /// substituted.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt_template = prompt.into();
        self
    }

    fn format_turns(turns: &[ChatMessage]) -> String {
        turns
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Summarizer for ModelSummarizer {
    async fn summarize(
        &self,
        prior_summary: &str,
        turns: &[ChatMessage],
    ) -> Result<String, ModelError> {
        if turns.is_empty() && prior_summary.is_empty() {
            return Ok(String::new());
        }

        let prior = if prior_summary.is_empty() {
            "(none)"
        } else {
            prior_summary
        };
        let prompt = self
            .prompt_template
            .replace("{summary}", prior)
            .replace("{conversation}", &Self::format_turns(turns));

        debug!(turns = turns.len(), "requesting combined summary");
        let response = self.provider.complete(&[ChatMessage::user(&prompt)]).await?;
        Ok(response.content.trim().to_string())
    }
}

/// Deterministic summarizer for tests: joins turn contents, prefixed by
/// the prior summary when present.
pub struct NoopSummarizer;

#[async_trait]
impl Summarizer for NoopSummarizer {
    async fn summarize(
        &self,
        prior_summary: &str,
        turns: &[ChatMessage],
    ) -> Result<String, ModelError> {
        let joined = turns
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join(" | ");

        if prior_summary.is_empty() {
            Ok(joined)
        } else if joined.is_empty() {
            Ok(prior_summary.to_string())
        } else {
            Ok(format!("{} | {}", prior_summary, joined))
        }
    }
}
