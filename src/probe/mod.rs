//! HTTP probe against the inference server.
//!
//! A probe is one synchronous, non-streaming round trip. Every failure is
//! classified into a [`ProbeError`] variant instead of being raised, so test
//! bodies can distinguish "server down" from "server answered garbage".
//!
//! # Endpoints
//!
//! | Endpoint                | Method | Extracted field                 |
//! |-------------------------|--------|---------------------------------|
//! | `/api/tags`             | GET    | `models[].name`                 |
//! | `/api/version`          | GET    | `version`                       |
//! | `/v1/chat/completions`  | POST   | `choices[0].message.content`    |
//! | `/api/generate`         | POST   | `response`                      |
//!
//! # Example
//!
//! ```rust,ignore
//! use chirai::config::ServerConfig;
//! use chirai::probe::{ChatOptions, ProbeClient};
//!
//! let probe = ProbeClient::new(&ServerConfig::default())?;
//! let reply = probe.chat_text("gemma3:1b", "What is 2+2?").await?;
//! println!("{} ({:.2}s)", reply.content, reply.elapsed.as_secs_f64());
//! ```

mod client;
mod error;
mod types;

pub use client::{ProbeClient, PROBE_USER_AGENT};
pub use error::ProbeError;
pub use types::{ChatMessage, ChatOptions, ChatReply, ChatRequest, GenerateRequest, ModelInfo};
