//! Scripted provider for tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use memolab_core::{ChatMessage, ModelError, ModelProvider, ModelResponse};

/// Plays back canned replies in order and records every request it saw.
/// When the script runs out the last reply repeats.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    responses: Vec<String>,
    next: usize,
    fail_with: Option<String>,
    calls: Vec<Vec<ChatMessage>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        provider.set_responses(responses);
        provider
    }

    pub fn set_response(&self, response: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.responses = vec![response.into()];
        inner.next = 0;
    }

    pub fn set_responses<I, S>(&self, responses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inner = self.inner.write();
        inner.responses = responses.into_iter().map(Into::into).collect();
        inner.next = 0;
    }

    /// Every subsequent call fails until `clear_error`.
    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().fail_with = Some(message.into());
    }

    pub fn clear_error(&self) {
        self.inner.write().fail_with = None;
    }

    pub fn call_count(&self) -> usize {
        self.inner.read().calls.len()
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.inner.read().calls.clone()
    }

    pub fn last_call(&self) -> Option<Vec<ChatMessage>> {
        self.inner.read().calls.last().cloned()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ModelResponse, ModelError> {
        let mut inner = self.inner.write();
        inner.calls.push(messages.to_vec());

        if let Some(message) = &inner.fail_with {
            return Err(ModelError::Other(message.clone()));
        }

        if inner.responses.is_empty() {
            return Ok(ModelResponse::new("ok", "scripted", Duration::ZERO));
        }

        let index = inner.next.min(inner.responses.len() - 1);
        let content = inner.responses[index].clone();
        if index + 1 < inner.responses.len() {
            inner.next = index + 1;
        }

        Ok(ModelResponse::new(content, "scripted", Duration::ZERO))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
