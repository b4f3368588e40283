//! Publish error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors that can occur while publishing a video.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Upload session failed: {0}")]
    SessionFailed(String),

    #[error("Upload timed out after {advances} chunk advances ({elapsed:?})")]
    Timeout { advances: u32, elapsed: Duration },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PublishError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn malformed_credentials(msg: impl Into<String>) -> Self {
        Self::MalformedCredentials(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn session_failed(msg: impl Into<String>) -> Self {
        Self::SessionFailed(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::AuthFailed(format!("HTTP {}: {}", status, message)),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, message)),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PublishError::Timeout { .. })
    }
}
