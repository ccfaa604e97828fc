//! Model provider trait and its error taxonomy

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::ChatMessage;

/// A text-generation collaborator: an external process or a test double
/// that turns a message sequence into a reply.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ModelResponse, ModelError>;

    fn provider_name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: String,
    pub model: String,
    pub elapsed: Duration,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>, model: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            elapsed,
        }
    }
}

/// Failure modes of the external collaborator. An empty reply is not an
/// error; callers surface empty content as-is.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model binary not available: {0}")]
    Unavailable(String),

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model process exited with {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },

    #[error("io error talking to model process: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
