//! Error types for the message queue publisher adapter.
//!
//! Publish failures never cross the batch orchestrator boundary as
//! panics or request-level errors; they are captured per record, so the
//! taxonomy here is the full vocabulary a per-record failure can carry.

use thiserror::Error;

/// Errors that can occur when publishing a record to the queue.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Request timed out before the queue acknowledged the message.
    #[error("publish timeout: {0}")]
    Timeout(String),

    /// Network-level failure reaching the queue service.
    #[error("network error: {0}")]
    Network(String),

    /// The queue service rejected the request.
    #[error("queue API error: {status_code} - {message}")]
    Api {
        /// HTTP status code returned by the queue service.
        status_code: u16,
        /// Error message from the queue service.
        message: String,
    },

    /// The record could not be serialized to the wire format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The adapter was misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PublishError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns true if a retry of the same publish could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Api { status_code, .. } => *status_code >= 500 || *status_code == 429,
            Self::Serialization(_) | Self::Configuration(_) => false,
        }
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Error Construction Tests ====================

    #[test]
    fn test_api_error_construction() {
        let err = PublishError::api(404, "topic not found");
        assert!(matches!(err, PublishError::Api { status_code: 404, .. }));
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("topic not found"));
    }

    #[test]
    fn test_timeout_error_display() {
        let err = PublishError::Timeout("deadline exceeded".to_string());
        assert!(err.to_string().contains("timeout"));
        assert!(err.to_string().contains("deadline exceeded"));
    }

    // ==================== Transience Tests ====================

    #[test]
    fn test_timeout_is_transient() {
        let err = PublishError::Timeout("deadline exceeded".to_string());
        assert!(err.is_transient());
    }

    #[test]
    fn test_network_error_is_transient() {
        let err = PublishError::Network("connection refused".to_string());
        assert!(err.is_transient());
    }

    #[test]
    fn test_server_error_is_transient() {
        let err = PublishError::api(503, "unavailable");
        assert!(err.is_transient());
    }

    #[test]
    fn test_rate_limited_is_transient() {
        let err = PublishError::api(429, "resource exhausted");
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_error_is_not_transient() {
        let err = PublishError::api(400, "invalid message");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_serialization_error_is_not_transient() {
        let err = PublishError::Serialization("bad payload".to_string());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_configuration_error_is_not_transient() {
        let err = PublishError::Configuration("missing topic".to_string());
        assert!(!err.is_transient());
    }
}
