//! Slides and the composition plan.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::encoding::{RenderSettings, SlideStyle};
use crate::script::Script;

/// Slide variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    /// Title card, always first
    Title,
    /// One bullet of the script
    Bullet,
}

impl SlideKind {
    /// Style for this variant.
    pub fn style<'a>(&self, settings: &'a RenderSettings) -> &'a SlideStyle {
        match self {
            SlideKind::Title => &settings.title_style,
            SlideKind::Bullet => &settings.bullet_style,
        }
    }
}

/// A fixed-duration visual unit: solid background with a centred caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Slide {
    pub kind: SlideKind,
    pub caption: String,
    /// Duration in seconds
    pub duration: f64,
}

impl Slide {
    /// Title card for a script.
    pub fn title(caption: impl Into<String>, settings: &RenderSettings) -> Self {
        Self {
            kind: SlideKind::Title,
            caption: caption.into(),
            duration: settings.title_duration,
        }
    }

    /// Bullet slide.
    pub fn bullet(caption: impl Into<String>, settings: &RenderSettings) -> Self {
        Self {
            kind: SlideKind::Bullet,
            caption: caption.into(),
            duration: settings.bullet_duration,
        }
    }

    /// Title slide followed by one bullet slide per bullet, in script order.
    pub fn sequence(script: &Script, settings: &RenderSettings) -> Vec<Slide> {
        std::iter::once(Slide::title(&script.title, settings))
            .chain(script.bullets.iter().map(|b| Slide::bullet(b, settings)))
            .collect()
    }
}

/// Everything the composer needs to know before encoding.
///
/// The output is trimmed, never stretched: its duration is
/// `min(visual_duration, audio_duration)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompositionPlan {
    pub slides: Vec<Slide>,
    /// Sum of slide durations (seconds)
    pub visual_duration: f64,
    /// Narration duration (seconds)
    pub audio_duration: f64,
    /// Final duration (seconds)
    pub output_duration: f64,
    /// Whether the audio track is generated silence (no narration)
    pub silent: bool,
}

impl CompositionPlan {
    /// Plan a video with narration of known length.
    pub fn narrated(slides: Vec<Slide>, audio_duration: f64) -> Self {
        let visual_duration = total_duration(&slides);
        let audio_duration = audio_duration.max(0.0);

        Self {
            slides,
            visual_duration,
            audio_duration,
            output_duration: visual_duration.min(audio_duration),
            silent: false,
        }
    }

    /// Plan a video without narration.
    ///
    /// The audio track is silence spanning the whole visual track, so
    /// nothing is trimmed.
    pub fn silent(slides: Vec<Slide>) -> Self {
        let visual_duration = total_duration(&slides);

        Self {
            slides,
            visual_duration,
            audio_duration: visual_duration,
            output_duration: visual_duration,
            silent: true,
        }
    }

    /// Whether trailing slide content is cut off by the audio boundary.
    pub fn is_trimmed(&self) -> bool {
        self.output_duration < self.visual_duration
    }
}

fn total_duration(slides: &[Slide]) -> f64 {
    slides.iter().map(|s| s.duration).sum()
}
