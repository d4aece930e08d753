//! Wire types for the inference server API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single role/content message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role (`system`, `user`, `assistant`)
    pub role: String,
    /// Message text; may be empty
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an arbitrary role
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a `user` message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create a `system` message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

/// OpenAI-compatible chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// Target model identifier
    pub model: &'a str,
    /// Ordered conversation
    pub messages: &'a [ChatMessage],
    /// Always `false`; streaming is not modeled
    pub stream: bool,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion token limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Native `/api/generate` request body.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    /// Target model identifier
    pub model: &'a str,
    /// Prompt text
    pub prompt: &'a str,
    /// Always `false`
    pub stream: bool,
}

/// Per-call chat options.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Completion token limit
    pub max_tokens: Option<u32>,
    /// Overrides the client's overall request timeout for this call
    pub timeout: Option<Duration>,
}

impl ChatOptions {
    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set a per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A successful chat completion.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Extracted `choices[0].message.content` (may be empty)
    pub content: String,
    /// Model that was asked
    pub model: String,
    /// Round-trip wall-clock time
    pub elapsed: Duration,
}

/// A model listed by `/api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name including tag (e.g. `gemma3:1b`)
    pub name: String,
    /// Size on disk in bytes, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
