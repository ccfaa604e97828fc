//! Ollama subprocess provider

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use memolab_core::{ChatMessage, ModelError, ModelProvider, ModelResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Talks to a locally installed `ollama` binary by spawning
/// `ollama run <model> <prompt>` per completion. The child is killed if
/// the caller gives up waiting.
pub struct OllamaClient {
    binary: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            binary: "ollama".to_string(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the executable, e.g. an absolute path outside `$PATH`.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Flattens the message sequence into a single plain-text prompt.
    /// `ollama run` takes one positional prompt, not a chat payload.
    fn render_prompt(messages: &[ChatMessage]) -> String {
        let mut prompt = String::new();
        for msg in messages {
            prompt.push_str(msg.role.label());
            prompt.push_str(": ");
            prompt.push_str(&msg.content);
            prompt.push('\n');
        }
        prompt.push_str("Assistant: ");
        prompt
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ModelResponse, ModelError> {
        let prompt = Self::render_prompt(messages);
        debug!(model = %self.model, prompt_len = prompt.len(), "spawning ollama");

        let start = Instant::now();
        let mut cmd = Command::new(&self.binary);
        cmd.arg("run")
            .arg(&self.model)
            .arg(&prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelError::Unavailable(self.binary.clone())
            } else {
                ModelError::Io(e)
            }
        })?;

        // Dropping the wait future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ModelError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), "ollama exited non-zero");
            return Err(ModelError::NonZeroExit {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let content = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(ModelResponse::new(content, self.model.clone(), start.elapsed()))
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}
