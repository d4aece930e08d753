//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the binaries on top of the loaded config)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmokeError};

/// Upper bound for any single timeout setting, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Upper bound for request counts in the load checks
pub const MAX_LOAD_REQUESTS: usize = 1000;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inference server connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Default battery settings
    #[serde(default)]
    pub suite: SuiteConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Benchmark settings
    #[serde(default)]
    pub bench: BenchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SmokeError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| SmokeError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location (`<config dir>/chirai/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chirai").join("config.toml"))
    }

    /// Load from an explicit path, else the default path if it exists, else defaults.
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };
        Ok(base.with_env_overrides())
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CHIRAI_BASE_URL") {
            self.server.base_url = url;
        }
        if let Ok(secs) = std::env::var("CHIRAI_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.server.request_timeout_secs = secs;
            }
        }
        if let Ok(dir) = std::env::var("CHIRAI_OUTPUT_DIR") {
            self.report.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(SmokeError::Config("server.base_url must not be empty".into()));
        }
        check_timeout("server.connect_timeout_secs", self.server.connect_timeout_secs)?;
        check_timeout("server.request_timeout_secs", self.server.request_timeout_secs)?;
        check_timeout("suite.test_timeout_secs", self.suite.test_timeout_secs)?;

        check_count("suite.concurrency_workers", self.suite.concurrency_workers)?;
        check_count("suite.concurrent_requests", self.suite.concurrent_requests)?;
        check_count("suite.burst_attempts", self.suite.burst_attempts)?;
        check_count("suite.response_time_samples", self.suite.response_time_samples)?;
        if self.suite.burst_min_success_percent > 100 {
            return Err(SmokeError::Config(
                "suite.burst_min_success_percent must be within 0-100".into(),
            ));
        }
        Ok(())
    }
}

fn check_timeout(key: &str, secs: u64) -> Result<()> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(SmokeError::Config(format!(
            "{key} must be within 1-{MAX_TIMEOUT_SECS}, got {secs}"
        )));
    }
    Ok(())
}

fn check_count(key: &str, count: usize) -> Result<()> {
    if count == 0 || count > MAX_LOAD_REQUESTS {
        return Err(SmokeError::Config(format!(
            "{key} must be within 1-{MAX_LOAD_REQUESTS}, got {count}"
        )));
    }
    Ok(())
}

/// Inference server connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the inference server (e.g., http://localhost:11434)
    pub base_url: String,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Overall request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Default battery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// General-purpose chat model
    pub chat_model: String,

    /// Model used for Japanese/Chinese prompts
    pub japanese_model: String,

    /// Models that must be listed by the server
    pub required_models: Vec<String>,

    /// Per-case wall-clock timeout in seconds
    pub test_timeout_secs: u64,

    /// Worker pool size for the concurrency check
    pub concurrency_workers: usize,

    /// Requests fired by the concurrency check
    pub concurrent_requests: usize,

    /// Sequential requests in the rate-limit check
    pub burst_attempts: usize,

    /// Minimum percentage of burst requests that must succeed
    pub burst_min_success_percent: usize,

    /// Samples taken by the response time check
    pub response_time_samples: usize,

    /// Maximum acceptable average response time in seconds
    pub max_avg_response_secs: f64,

    /// Maximum acceptable resident memory of this process in MB
    pub max_memory_mb: f64,

    /// Treat "graceful failure" checks as always passing
    pub lenient_graceful_checks: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            chat_model: "gemma3:1b".to_string(),
            japanese_model: "qwen2.5:3b".to_string(),
            required_models: vec!["gemma3:1b".to_string(), "qwen2.5:3b".to_string()],
            test_timeout_secs: 30,
            concurrency_workers: 3,
            concurrent_requests: 3,
            burst_attempts: 10,
            burst_min_success_percent: 70,
            response_time_samples: 5,
            max_avg_response_secs: 5.0,
            max_memory_mb: 500.0,
            lenient_graceful_checks: false,
        }
    }
}

impl SuiteConfig {
    /// Per-case timeout as a `Duration`
    pub fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout_secs)
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory receiving report artifacts
    pub output_dir: PathBuf,

    /// Write the JSON report
    pub json: bool,

    /// Write the Markdown report
    pub markdown: bool,

    /// Write the SVG dashboard
    pub chart: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            json: true,
            markdown: true,
            chart: true,
        }
    }
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Models to benchmark, in order
    pub models: Vec<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token limit
    pub max_tokens: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "gemma3:1b".to_string(),
                "gemma3:4b".to_string(),
                "jaahas/qwen3-abliterated:0.6b".to_string(),
            ],
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}
