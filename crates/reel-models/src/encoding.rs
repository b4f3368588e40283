//! Render settings for the composed video.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default frame width
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default frame height
pub const DEFAULT_HEIGHT: u32 = 720;
/// Default frame rate
pub const DEFAULT_FPS: u32 = 24;
/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Pixel format accepted by every player we upload to
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Title slide duration in seconds
pub const TITLE_SLIDE_SECONDS: f64 = 5.0;
/// Bullet slide duration in seconds
pub const BULLET_SLIDE_SECONDS: f64 = 60.0;

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// FFmpeg colour literal (e.g. `0x1E1E1E`).
    pub fn to_ffmpeg(&self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Visual style of one slide variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SlideStyle {
    /// Solid background colour
    pub background: Rgb,
    /// Caption font size in pixels
    pub font_size: u32,
    /// Caption colour (FFmpeg colour name or literal)
    pub font_color: String,
}

impl SlideStyle {
    /// Title card style.
    pub fn title() -> Self {
        Self {
            background: Rgb(30, 30, 30),
            font_size: 70,
            font_color: "white".to_string(),
        }
    }

    /// Bullet slide style.
    pub fn bullet() -> Self {
        Self {
            background: Rgb(20, 20, 60),
            font_size: 50,
            font_color: "white".to_string(),
        }
    }
}

/// Settings for slide composition and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderSettings {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Output frame rate
    pub fps: u32,
    /// Video codec
    pub video_codec: String,
    /// Audio codec
    pub audio_codec: String,
    /// Audio bitrate
    pub audio_bitrate: String,
    /// Output pixel format
    pub pixel_format: String,
    /// Title slide duration (seconds)
    pub title_duration: f64,
    /// Bullet slide duration (seconds)
    pub bullet_duration: f64,
    /// Title card style
    pub title_style: SlideStyle,
    /// Bullet slide style
    pub bullet_style: SlideStyle,
    /// Font file for captions; FFmpeg's default font when unset
    #[serde(default)]
    pub font_file: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            title_duration: TITLE_SLIDE_SECONDS,
            bullet_duration: BULLET_SLIDE_SECONDS,
            title_style: SlideStyle::title(),
            bullet_style: SlideStyle::bullet(),
            font_file: None,
        }
    }
}

impl RenderSettings {
    /// Returns new settings with a different bullet slide duration.
    pub fn with_bullet_duration(mut self, seconds: f64) -> Self {
        self.bullet_duration = seconds;
        self
    }

    /// Output encoding arguments for FFmpeg.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-r".to_string(),
            self.fps.to_string(),
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RenderSettings::default();
        assert_eq!((settings.width, settings.height), (1280, 720));
        assert_eq!(settings.fps, 24);
        assert_eq!(settings.video_codec, "libx264");
        assert_ne!(settings.title_style.background, settings.bullet_style.background);
    }

    #[test]
    fn test_rgb_literal() {
        assert_eq!(Rgb(30, 30, 30).to_ffmpeg(), "0x1E1E1E");
        assert_eq!(Rgb(20, 20, 60).to_ffmpeg(), "0x14143C");
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = RenderSettings::default().to_ffmpeg_args();
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"24".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
    }
}
