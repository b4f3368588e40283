//! Bounded chunk loop.

use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::error::{PublishError, PublishResult};
use crate::upload::{ResumableUpload, UploadStep, UploadedVideo};

/// Caps on one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_chunk_advances: u32,
    pub deadline: Duration,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_chunk_advances: 10_000,
            deadline: Duration::from_secs(2 * 60 * 60),
        }
    }
}

/// Advance `upload` until the host reports the created video.
///
/// Fails with [`PublishError::Timeout`] once `max_chunk_advances` calls have
/// not completed the upload or the deadline passes, including while a chunk
/// request is still in flight.
pub async fn drive_upload(
    upload: &mut dyn ResumableUpload,
    limits: UploadLimits,
) -> PublishResult<UploadedVideo> {
    let started = Instant::now();
    let deadline = started + limits.deadline;
    let mut advances = 0u32;

    loop {
        if advances >= limits.max_chunk_advances {
            return Err(PublishError::Timeout {
                advances,
                elapsed: started.elapsed(),
            });
        }

        let step = match tokio::time::timeout_at(deadline, upload.next_chunk()).await {
            Ok(step) => step?,
            Err(_) => {
                return Err(PublishError::Timeout {
                    advances,
                    elapsed: started.elapsed(),
                })
            }
        };
        advances += 1;
        metrics::counter!("reel_upload_chunks_total").increment(1);

        match step {
            UploadStep::InProgress(status) => {
                let percent = status.percent();
                metrics::gauge!("reel_upload_progress_percent").set(percent as f64);
                info!("Upload progress: {}%", percent);
            }
            UploadStep::Complete(video) => {
                metrics::gauge!("reel_upload_progress_percent").set(100.0);
                info!("Upload complete after {} chunk advances: {}", advances, video.id);
                return Ok(video);
            }
        }
    }
}
