//! Error types for the smoke-test harness.
//!
//! Failures that happen *inside* a test run (transport errors, bad status
//! codes, malformed JSON, failed assertions) never surface here: they become
//! failing [`TestOutcome`](crate::harness::TestOutcome)s. `SmokeError` covers
//! what can go wrong around a run: loading configuration, registering cases,
//! and writing report artifacts.

use thiserror::Error;

use crate::probe::ProbeError;

/// Harness, configuration and reporting errors.
#[derive(Error, Debug)]
pub enum SmokeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// A case with the same name already exists in the category.
    #[error("Duplicate test case '{name}' in category '{category}'")]
    DuplicateCase {
        /// Category the case was registered under.
        category: String,
        /// Name of the duplicated case.
        name: String,
    },

    /// An inference server round trip failed.
    ///
    /// Test bodies can propagate probe failures with `?`; the harness turns
    /// them into failing outcomes.
    #[error("Probe error: {0}")]
    Probe(#[source] ProbeError),

    /// Report rendering failed.
    #[error("Report error: {0}")]
    Report(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, SmokeError>;

impl From<ProbeError> for SmokeError {
    fn from(err: ProbeError) -> Self {
        SmokeError::Probe(err)
    }
}

impl From<toml::de::Error> for SmokeError {
    fn from(err: toml::de::Error) -> Self {
        SmokeError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_case_message() {
        let err = SmokeError::DuplicateCase {
            category: "infra".to_string(),
            name: "ping".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate test case 'ping' in category 'infra'"
        );
    }

    #[test]
    fn test_probe_error_keeps_source() {
        use std::error::Error as _;

        let err = SmokeError::from(ProbeError::Timeout("/api/tags".to_string()));
        assert!(err.to_string().starts_with("Probe error:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: SmokeError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, SmokeError::Config(_)));
    }
}
