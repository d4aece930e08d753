//! Check results and recorded outcomes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::probe::ProbeError;

/// What a test body reports: pass/fail, a message, optional details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Whether the check passed
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Structured detail
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl Check {
    /// A passing check
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// A failing check
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// A failing check describing a probe error
    pub fn probe_failed(context: &str, err: &ProbeError) -> Self {
        Self::fail(format!("{context}: {err}"))
    }

    /// Attach a detail value; values that fail to serialize are stored as null
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.details.insert(key.into(), value);
        self
    }
}

/// Execution state of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    /// Registered, not yet started
    Pending,
    /// Body is executing
    Running,
    /// Finished successfully (terminal)
    Passed,
    /// Finished unsuccessfully (terminal)
    Failed,
}

impl CaseState {
    /// Terminal states are never left
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

/// The single recorded result of running one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Case name
    pub name: String,
    /// Whether the case passed
    pub success: bool,
    /// Wall-clock execution time
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    /// Human-readable message
    pub message: String,
    /// Structured detail
    #[serde(default)]
    pub details: Map<String, Value>,
    /// Completion instant
    pub timestamp: DateTime<Utc>,
}

impl TestOutcome {
    /// Record a finished check
    pub fn from_check(name: impl Into<String>, check: Check, duration: Duration) -> Self {
        Self {
            name: name.into(),
            success: check.success,
            duration,
            message: check.message,
            details: check.details,
            timestamp: Utc::now(),
        }
    }

    /// Terminal state of the case
    pub fn state(&self) -> CaseState {
        if self.success {
            CaseState::Passed
        } else {
            CaseState::Failed
        }
    }
}

/// Durations as fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_details() {
        let check = Check::pass("3 models available")
            .with_detail("model_count", 3)
            .with_detail("models", ["a", "b", "c"]);

        assert!(check.success);
        assert_eq!(check.details["model_count"], json!(3));
        assert_eq!(check.details["models"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_probe_failed_message() {
        let check = Check::probe_failed("English chat", &ProbeError::Timeout("/v1/chat/completions".into()));
        assert!(!check.success);
        assert_eq!(
            check.message,
            "English chat: Request timed out: /v1/chat/completions"
        );
    }

    #[test]
    fn test_outcome_state() {
        let passed = TestOutcome::from_check("a", Check::pass("ok"), Duration::from_millis(5));
        let failed = TestOutcome::from_check("b", Check::fail("no"), Duration::ZERO);
        assert_eq!(passed.state(), CaseState::Passed);
        assert_eq!(failed.state(), CaseState::Failed);
        assert!(passed.state().is_terminal());
        assert!(!CaseState::Running.is_terminal());
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = TestOutcome::from_check(
            "Ollama Connectivity",
            Check::pass("2 models available").with_detail("model_count", 2),
            Duration::from_millis(1500),
        );

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["name"], "Ollama Connectivity");
        assert_eq!(value["success"], true);
        assert_eq!(value["duration"], 1.5);
        assert_eq!(value["details"]["model_count"], 2);
        assert!(value["timestamp"].is_string());

        let back: TestOutcome = serde_json::from_value(value).unwrap();
        assert_eq!(back.duration, Duration::from_millis(1500));
        assert_eq!(back.timestamp, outcome.timestamp);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let value = json!({
            "name": "x",
            "success": true,
            "duration": -1.0,
            "message": "",
            "timestamp": "2025-01-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<TestOutcome>(value).is_err());
    }
}
