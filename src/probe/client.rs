//! reqwest-backed probe client.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::error::{Result, SmokeError};

use super::error::{truncate_chars, ProbeError};
use super::types::{ChatMessage, ChatOptions, ChatReply, ChatRequest, GenerateRequest, ModelInfo};

/// User agent sent with every probe
pub const PROBE_USER_AGENT: &str = concat!("chirai-smoke/", env!("CARGO_PKG_VERSION"));

/// Client for single-shot round trips to the inference server.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl ProbeClient {
    /// Create a client from server configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Self::build(
            &config.base_url,
            config.connect_timeout(),
            config.request_timeout(),
        )
    }

    fn build(base_url: &str, connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(PROBE_USER_AGENT)
            .build()
            .map_err(|e| SmokeError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            connect_timeout,
            request_timeout,
        })
    }

    /// Same server, different timeouts
    pub fn with_timeouts(&self, connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        Self::build(&self.base_url, connect_timeout, request_timeout)
    }

    /// Same timeouts, different server
    pub fn with_base_url(&self, base_url: &str) -> Result<Self> {
        Self::build(base_url, self.connect_timeout, self.request_timeout)
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// List models (`GET /api/tags`)
    pub async fn list_models(&self) -> std::result::Result<Vec<ModelInfo>, ProbeError> {
        let value = self.get_json("/api/tags").await?;
        let models = value
            .get("models")
            .filter(|m| m.is_array())
            .cloned()
            .ok_or_else(|| ProbeError::MissingField("models".to_string()))?;

        serde_json::from_value(models)
            .map_err(|e| ProbeError::MissingField(format!("models[].name ({e})")))
    }

    /// Server version (`GET /api/version`)
    pub async fn version(&self) -> std::result::Result<String, ProbeError> {
        let value = self.get_json("/api/version").await?;
        value
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProbeError::MissingField("version".to_string()))
    }

    /// Chat completion (`POST /v1/chat/completions`)
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> std::result::Result<ChatReply, ProbeError> {
        if model.trim().is_empty() {
            return Err(ProbeError::InvalidRequest("model identifier is empty".to_string()));
        }

        let request = ChatRequest {
            model,
            messages,
            stream: false,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let start = Instant::now();
        let value = self
            .post_json("/v1/chat/completions", &request, options.timeout)
            .await?;
        let elapsed = start.elapsed();

        let content = value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::MissingField("choices[0].message.content".to_string()))?;

        Ok(ChatReply {
            content: content.to_string(),
            model: model.to_string(),
            elapsed,
        })
    }

    /// Chat completion with a single user message
    pub async fn chat_text(
        &self,
        model: &str,
        prompt: &str,
    ) -> std::result::Result<ChatReply, ProbeError> {
        self.chat(model, &[ChatMessage::user(prompt)], &ChatOptions::default())
            .await
    }

    /// Native completion (`POST /api/generate`)
    pub async fn generate(&self, model: &str, prompt: &str) -> std::result::Result<String, ProbeError> {
        if model.trim().is_empty() {
            return Err(ProbeError::InvalidRequest("model identifier is empty".to_string()));
        }

        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };
        let value = self.post_json("/api/generate", &request, None).await?;

        value
            .get("response")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProbeError::MissingField("response".to_string()))
    }

    async fn get_json(&self, path: &str) -> std::result::Result<Value, ProbeError> {
        let request = self.client.get(self.url(path));
        self.send(path, request).await
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> std::result::Result<Value, ProbeError> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        self.send(path, request).await
    }

    async fn send(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> std::result::Result<Value, ProbeError> {
        tracing::debug!("probe {}{}", self.base_url, path);

        let response = request.send().await.map_err(|e| {
            let err = ProbeError::from_reqwest(path, &e);
            tracing::warn!("probe {} failed: {}", path, err);
            err
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::from_reqwest(path, &e))?;

        if !status.is_success() {
            tracing::warn!("probe {} returned {}", path, status);
            return Err(ProbeError::status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("probe {} returned invalid JSON: {}", path, e);
            ProbeError::InvalidJson(format!("{e} in {}", truncate_chars(&body, 80)))
        })
    }
}
