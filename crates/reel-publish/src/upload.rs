//! Resumable upload abstractions.

use async_trait::async_trait;
use serde::Deserialize;

use crate::credentials::OAuthCredentials;
use crate::error::PublishResult;
use crate::metadata::VideoMetadata;

/// Smallest chunk granularity the resumable protocol accepts.
pub const CHUNK_GRANULARITY: usize = 256 * 1024;

/// Media payload of an upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub data: Vec<u8>,
    pub content_type: String,
    /// Bytes per request; `None` sends everything that remains in one request.
    pub chunk_size: Option<usize>,
}

impl MediaUpload {
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
            chunk_size: None,
        }
    }

    /// Split the payload into chunks of at least `size` bytes.
    ///
    /// Sizes are rounded up to a multiple of [`CHUNK_GRANULARITY`].
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        let chunks = size.max(1).div_ceil(CHUNK_GRANULARITY);
        self.chunk_size = Some(chunks * CHUNK_GRANULARITY);
        self
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Bytes acknowledged so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStatus {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl UploadStatus {
    /// Fraction of the payload acknowledged, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_sent as f64 / self.total_bytes as f64).min(1.0)
    }

    pub fn percent(&self) -> u32 {
        (self.progress() * 100.0) as u32
    }
}

/// The hosting platform's view of a finished upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedVideo {
    pub id: String,
}

/// Outcome of one chunk advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStep {
    InProgress(UploadStatus),
    Complete(UploadedVideo),
}

/// An open upload session that is advanced one chunk at a time.
#[async_trait]
pub trait ResumableUpload: Send {
    async fn next_chunk(&mut self) -> PublishResult<UploadStep>;
}

/// Capability that accepts new videos.
#[async_trait]
pub trait VideoHost: Send + Sync {
    /// Authorize with `credentials` and prepare an upload of `media`.
    async fn insert(
        &self,
        credentials: &OAuthCredentials,
        metadata: &VideoMetadata,
        media: MediaUpload,
    ) -> PublishResult<Box<dyn ResumableUpload>>;
}
