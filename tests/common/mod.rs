//! Stub inference server shared by the end-to-end tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chirai::config::ServerConfig;
use chirai::ProbeClient;
use serde_json::{json, Value};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Probe against `base_url` with short timeouts.
pub fn probe(base_url: &str) -> ProbeClient {
    ProbeClient::new(&ServerConfig {
        base_url: base_url.to_string(),
        connect_timeout_secs: 2,
        request_timeout_secs: 2,
    })
    .unwrap()
}

/// OpenAI-style completion body.
pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn tags() -> Json<Value> {
    Json(json!({
        "models": [
            {"name": "gemma3:1b", "size": 815_319_791_u64},
            {"name": "qwen2.5:3b", "size": 1_929_912_432_u64}
        ]
    }))
}

async fn version() -> Json<Value> {
    Json(json!({"version": "0.9.0"}))
}

async fn generate() -> Json<Value> {
    Json(json!({"model": "gemma3:1b", "response": "Hello!", "done": true}))
}

async fn healthy_chat(Json(body): Json<Value>) -> Response {
    if body["model"] == "invalid:model" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": "model \"invalid:model\" not found"}})),
        )
            .into_response();
    }
    Json(completion("こんにちは！元気です。4")).into_response()
}

/// A well-behaved Ollama-compatible server.
pub fn healthy_router() -> Router {
    Router::new()
        .route("/api/tags", get(tags))
        .route("/api/version", get(version))
        .route("/api/generate", post(generate))
        .route("/v1/chat/completions", post(healthy_chat))
}

/// Every endpoint answers 500.
pub fn broken_router() -> Router {
    let fail = || async { (StatusCode::INTERNAL_SERVER_ERROR, "internal error") };
    Router::new()
        .route("/api/tags", get(fail))
        .route("/api/version", get(fail))
        .route("/api/generate", post(fail))
        .route("/v1/chat/completions", post(fail))
}

/// Chat answers only after `delay`.
pub fn slow_chat_router(delay: Duration) -> Router {
    Router::new().route(
        "/v1/chat/completions",
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(completion("late"))
        }),
    )
}

/// Chat answers 200 with a body that is not JSON.
pub fn garbage_chat_router() -> Router {
    Router::new().route("/v1/chat/completions", post(|| async { "<html>oops</html>" }))
}

/// Chat answers valid JSON without `choices[0].message.content`.
pub fn empty_choices_router() -> Router {
    Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"choices": []})) }),
    )
}

/// Counts chat calls and fails the ones whose 0-based index is listed.
#[derive(Clone, Default)]
pub struct FlakyChat {
    calls: Arc<AtomicUsize>,
    failing: Arc<HashSet<usize>>,
}

impl FlakyChat {
    pub fn failing(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(indices.into_iter().collect()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v1/chat/completions", post(flaky_chat))
            .with_state(self.clone())
    }
}

async fn flaky_chat(State(stub): State<FlakyChat>) -> Response {
    let call = stub.calls.fetch_add(1, Ordering::SeqCst);
    if stub.failing.contains(&call) {
        (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response()
    } else {
        Json(completion("ok")).into_response()
    }
}
