//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Progress percentage of an output of `total_seconds`.
    pub fn percentage(&self, total_seconds: f64) -> f64 {
        if self.is_complete {
            return 100.0;
        }
        if total_seconds <= 0.0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / 1000.0 / total_seconds) * 100.0).clamp(0.0, 100.0)
    }

    /// Estimated seconds of encoding left.
    pub fn eta_seconds(&self, total_seconds: f64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_ms <= 0 {
            return None;
        }

        let remaining = total_seconds - self.out_time_ms as f64 / 1000.0;
        Some((remaining / self.speed).max(0.0))
    }
}
