//! Caption wrapping.

/// Fraction of the frame width available to captions.
const CAPTION_WIDTH_RATIO: f64 = 0.9;
/// Average glyph width relative to font size.
const GLYPH_WIDTH_RATIO: f64 = 0.55;

/// Characters that fit on one caption line.
pub fn max_chars_per_line(frame_width: u32, font_size: u32) -> usize {
    let usable = frame_width as f64 * CAPTION_WIDTH_RATIO;
    let glyph = (font_size.max(1) as f64) * GLYPH_WIDTH_RATIO;
    ((usable / glyph).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line get a line of their own.
pub fn wrap_caption(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_chars_for_default_fonts() {
        assert_eq!(max_chars_per_line(1280, 70), 29);
        assert_eq!(max_chars_per_line(1280, 50), 41);
        assert_eq!(max_chars_per_line(10, 500), 1);
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_caption("the quick brown fox jumps over the lazy dog", 15);
        assert_eq!(lines, vec!["the quick brown", "fox jumps over", "the lazy dog"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 15));
    }

    #[test]
    fn test_wrap_long_word() {
        let lines = wrap_caption("a supercalifragilistic word", 10);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "word"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_caption("   ", 20).is_empty());
    }
}
