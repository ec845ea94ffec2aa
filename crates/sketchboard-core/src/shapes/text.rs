//! Text element data.

use serde::{Deserialize, Serialize};

/// Font family options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Hand-drawn style font (default).
    #[default]
    Handwritten,
    /// Clean sans-serif font.
    Normal,
    /// Monospaced font.
    Code,
}

impl FontFamily {
    /// Get the font family name as used by the renderer.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Handwritten => "Virgil",
            FontFamily::Normal => "Helvetica",
            FontFamily::Code => "Cascadia",
        }
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Bold,
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font settings applied to new text elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontOptions {
    pub family: FontFamily,
    pub size: f64,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub align: TextAlign,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            family: FontFamily::default(),
            size: TextData::DEFAULT_FONT_SIZE,
            weight: FontWeight::default(),
            style: FontStyle::default(),
            align: TextAlign::default(),
        }
    }
}

/// Type-specific data of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    /// The text content (may contain newlines).
    pub text: String,
    #[serde(default)]
    pub font: FontOptions,
}

impl TextData {
    /// Default font size in world units.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Minimum width of a text box, so an empty box stays clickable.
    pub const MIN_WIDTH: f64 = 20.0;

    pub fn new(text: impl Into<String>, font: FontOptions) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }

    /// Check if the text has no visible content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Approximate width based on the longest line.
    /// The renderer owns real layout; this keeps hit-testing and snapping usable.
    pub fn approximate_width(&self) -> f64 {
        let longest = self
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        (longest as f64 * self.font.size * 0.6).max(Self::MIN_WIDTH)
    }

    /// Approximate height based on the line count.
    pub fn approximate_height(&self) -> f64 {
        // `lines()` drops a trailing empty line, count newlines instead
        let lines = self.text.matches('\n').count() + 1;
        lines as f64 * self.font.size * 1.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_minimum_box() {
        let data = TextData::new("", FontOptions::default());
        assert!(data.is_blank());
        assert!((data.approximate_width() - TextData::MIN_WIDTH).abs() < f64::EPSILON);
        assert!((data.approximate_height() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiline_measurement() {
        let data = TextData::new("ab\nabcd\n", FontOptions::default());
        // Longest line has 4 chars at 0.6 * 20
        assert!((data.approximate_width() - 48.0).abs() < 1e-9);
        // Two newlines means three lines
        assert!((data.approximate_height() - 72.0).abs() < 1e-9);
    }
}
