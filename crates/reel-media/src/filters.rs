//! FFmpeg source and filter definitions for slides.

use std::path::Path;

use reel_models::{RenderSettings, SlideStyle};

/// Sample rate of the generated silent track.
pub const SILENCE_SAMPLE_RATE: u32 = 44_100;

/// Vertical gap between caption lines in pixels.
const CAPTION_LINE_SPACING: u32 = 12;

/// Solid colour source for one slide.
pub fn color_source(style: &SlideStyle, settings: &RenderSettings, duration: f64) -> String {
    format!(
        "color=c={}:s={}x{}:r={}:d={:.3}",
        style.background.to_ffmpeg(),
        settings.width,
        settings.height,
        settings.fps,
        duration
    )
}

/// Silent stereo audio source.
pub fn silence_source() -> String {
    format!("anullsrc=r={}:cl=stereo", SILENCE_SAMPLE_RATE)
}

/// Centred caption read from a text file.
///
/// Text expansion is disabled so `%` and `\` in the caption render literally.
pub fn drawtext(caption_file: &Path, style: &SlideStyle, font_file: Option<&str>) -> String {
    let mut filter = format!(
        "drawtext=textfile={}:expansion=none:fontsize={}:fontcolor={}:line_spacing={}:x=(w-text_w)/2:y=(h-text_h)/2",
        escape_filter_value(&caption_file.to_string_lossy()),
        style.font_size,
        style.font_color,
        CAPTION_LINE_SPACING
    );

    if let Some(font) = font_file {
        filter.push_str(":fontfile=");
        filter.push_str(&escape_filter_value(font));
    }

    filter
}

/// Filter graph captioning each slide input and concatenating them.
///
/// Slide `i` is expected at input index `i`; the result is labelled `[vout]`.
pub fn slide_graph(captions: &[String]) -> String {
    let mut graph = String::new();

    for (i, caption) in captions.iter().enumerate() {
        graph.push_str(&format!("[{}:v]{}[s{}];", i, caption, i));
    }

    for i in 0..captions.len() {
        graph.push_str(&format!("[s{}]", i));
    }
    graph.push_str(&format!("concat=n={}:v=1:a=0[vout]", captions.len()));

    graph
}

/// Escape a value for use inside a filter option.
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ':' | '\'' | ',' | ';' | '[' | ']' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
