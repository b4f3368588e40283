//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid script: {0}")]
    Script(#[from] reel_models::ScriptError),

    #[error("ML service error: {0}")]
    Ml(#[from] reel_ml_client::MlError),

    #[error("Media error: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] reel_storage::StorageError),

    #[error("Publish error: {0}")]
    Publish(#[from] reel_publish::PublishError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if the artifact to publish does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkerError::Storage(e) if e.is_not_found())
    }
}
