//! FFmpeg CLI wrapper for slide composition and encoding.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with file and lavfi inputs
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe duration probing
//! - Caption wrapping and the slide filter graph
//! - The `VideoComposer` capability and its FFmpeg implementation

pub mod caption;
pub mod command;
pub mod compose;
pub mod error;
pub mod filters;
pub mod probe;
pub mod progress;

pub use caption::{max_chars_per_line, wrap_caption};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{ComposedVideo, CompositionRequest, FfmpegComposer, VideoComposer};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_duration, probe_media, MediaInfo};
pub use progress::FfmpegProgress;
