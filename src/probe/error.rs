//! Probe failure classification.

use thiserror::Error;

/// Maximum number of characters of an error body kept in [`ProbeError::Status`].
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// Why a probe round trip did not produce a payload.
///
/// Transport errors (`Connect`, `Timeout`, `Transport`) mean the server was
/// never heard from; protocol errors (`Status`, `InvalidJson`,
/// `MissingField`) mean it answered with something unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The request was rejected before any I/O (e.g. empty model id).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Connection refused or unreachable.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Connect or overall request timeout elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The body was not valid JSON.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    /// Valid JSON without the expected field.
    #[error("Missing field in response: {0}")]
    MissingField(String),
}

impl ProbeError {
    /// True when the server was never reached (or never answered).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::Timeout(_) | Self::Transport(_)
        )
    }

    /// True when the server answered but the answer was unusable.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::InvalidJson(_) | Self::MissingField(_)
        )
    }

    /// Build a `Status` error, truncating the body.
    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: truncate_chars(body, MAX_ERROR_BODY_CHARS),
        }
    }

    /// Classify a reqwest error for `endpoint`.
    pub(crate) fn from_reqwest(endpoint: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(endpoint.to_string())
        } else if err.is_connect() {
            Self::Connect(format!("{endpoint}: {err}"))
        } else {
            Self::Transport(format!("{endpoint}: {err}"))
        }
    }
}

/// Truncate to at most `max` characters, on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ProbeError::Connect("x".into()).is_transport());
        assert!(ProbeError::Timeout("x".into()).is_transport());
        assert!(!ProbeError::Timeout("x".into()).is_protocol());
        assert!(ProbeError::status(404, "not found").is_protocol());
        assert!(ProbeError::InvalidJson("x".into()).is_protocol());
        assert!(ProbeError::MissingField("choices".into()).is_protocol());
        assert!(!ProbeError::InvalidRequest("x".into()).is_transport());
        assert!(!ProbeError::InvalidRequest("x".into()).is_protocol());
    }

    #[test]
    fn test_status_body_truncated() {
        let body = "あ".repeat(500);
        match ProbeError::status(500, &body) {
            ProbeError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 3);
                assert!(body.ends_with("..."));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate_chars("hello", 20), "hello");
        assert_eq!(truncate_chars("", 20), "");
    }

    #[test]
    fn test_display_messages_distinct() {
        let messages = [
            ProbeError::Connect("a".into()).to_string(),
            ProbeError::Timeout("a".into()).to_string(),
            ProbeError::Transport("a".into()).to_string(),
            ProbeError::status(502, "a").to_string(),
            ProbeError::InvalidJson("a".into()).to_string(),
            ProbeError::MissingField("a".into()).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
