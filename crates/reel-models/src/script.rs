//! Script produced by the text generator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters treated as a bullet marker at the start of a line.
pub const BULLET_MARKERS: &[char] = &['-', '–', '—', '*', '•'];

/// Errors raised while parsing generated script text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Generated script has no non-empty lines")]
    Empty,
}

/// A short-form video script: one title and an ordered list of bullets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Script {
    /// First non-empty line of the generated text
    pub title: String,
    /// Remaining lines, in generation order
    pub bullets: Vec<String>,
}

impl Script {
    /// Create a script from its parts.
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
        }
    }

    /// Parse raw generated text.
    ///
    /// Blank lines are skipped, every remaining line is trimmed and has its
    /// bullet marker stripped. The first line becomes the title and the rest
    /// become bullets, so N non-empty lines always yield N-1 bullets.
    pub fn parse(raw: &str) -> Result<Self, ScriptError> {
        let mut lines = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(strip_marker);

        let title = lines.next().ok_or(ScriptError::Empty)?;
        let bullets = lines.collect();

        Ok(Self::new(title, bullets))
    }

    /// Text sent to the speech synthesizer (bullets joined by newlines).
    ///
    /// Empty when the script has no bullets.
    pub fn narration_text(&self) -> String {
        self.bullets.join("\n")
    }

    /// Whether the script carries any bullets.
    pub fn has_bullets(&self) -> bool {
        !self.bullets.is_empty()
    }
}

/// Strip surrounding whitespace, leading bullet markers and trailing dashes.
fn strip_marker(line: &str) -> String {
    line.trim_start_matches(|c: char| c.is_whitespace() || BULLET_MARKERS.contains(&c))
        .trim_end_matches(|c: char| c.is_whitespace() || c == '–' || c == '—')
        .to_string()
}
