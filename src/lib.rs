//! # ChirAI Smoke - Inference Server Test Harness
//!
//! End-to-end smoke testing for a local Ollama-compatible LLM server: probe
//! the HTTP API, run a categorized battery of checks with per-case timeouts,
//! grade the run and write console, JSON, Markdown and SVG reports.
//!
//! ## Features
//!
//! - **Probe**: typed client for `/api/tags`, `/api/version`, `/api/generate`
//!   and the OpenAI-compatible `/v1/chat/completions`
//! - **Harness**: ordered registry of async cases; a panic, error or timeout in
//!   one case becomes a failed outcome and never stops the run
//! - **Load**: bounded parallel requests and burst policies
//! - **Suite**: 22 checks across seven categories
//! - **Report**: success rate, grade, per-category breakdown and artifacts
//! - **Bench**: Japanese prompt sets scored per model
//!
//! ## Architecture
//!
//! ```text
//!  Config ──> ProbeClient ──> SuiteContext ──> build_suite() ──> Harness
//!                                                                   │
//!                                                         run_all() │
//!                                                                   v
//!  console <── RunReport <────────────────────────────────────── ResultSet
//!  JSON / Markdown / SVG
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use chirai::{build_suite, Config, ProbeClient, RunReport, SuiteContext};
//!
//! let config = Config::load(None)?;
//! let probe = ProbeClient::new(&config.server)?;
//! let ctx = Arc::new(SuiteContext::new(probe, config.suite.clone()));
//!
//! let started = chrono::Utc::now();
//! let results = build_suite(ctx)?.run_all().await;
//! let elapsed = (chrono::Utc::now() - started).to_std().unwrap_or_default();
//!
//! let report = RunReport::new(results, started, elapsed, &config.server.base_url);
//! chirai::report::write_all(&report, &config.report)?;
//! println!("{}", report.grade);
//! ```
//!
//! ## Custom Cases
//!
//! ```rust,ignore
//! use chirai::harness::{Category, Check, Harness};
//!
//! let mut harness = Harness::new();
//! harness.register(Category::new("custom"), "Always green", || async {
//!     Ok(Check::pass("fine"))
//! })?;
//! let results = harness.run_all().await;
//! assert_eq!(results.passed(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`probe`]: HTTP probe against the server under test
//! - [`harness`]: Case registry, runner and results
//! - [`suite`]: Default battery of checks
//! - [`report`]: Console, JSON, Markdown and SVG output
//! - [`bench`]: Japanese quality benchmark
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod bench;
pub mod config;
pub mod error;
pub mod harness;
pub mod probe;
pub mod report;
pub mod suite;

// Re-exports for convenience
pub use bench::{BenchReport, BenchRunner, ModelBenchSummary};
pub use config::{BenchConfig, Config, ReportConfig, ServerConfig, SuiteConfig};
pub use error::{Result, SmokeError};
pub use harness::{Category, Check, Grade, Harness, ResultSet, Summary, TestCase, TestOutcome};
pub use probe::{ProbeClient, ProbeError};
pub use report::RunReport;
pub use suite::{build_suite, SuiteContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
