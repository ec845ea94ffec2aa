//! Style attributes shared by every element and by the tool options.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Check if the color is fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// How the interior of a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStyle {
    #[default]
    Transparent,
    Solid,
    /// Hand-drawn parallel strokes.
    Hachure,
}

/// Corner rendering for rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    #[default]
    Sharp,
    Round,
}

/// Sloppiness level for the hand-drawn effect applied by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sloppiness {
    /// Clean, precise lines.
    Architect,
    /// Slight hand-drawn feel.
    #[default]
    Artist,
    /// Very sketchy strokes.
    Cartoonist,
}

impl Sloppiness {
    /// Get the roughness value handed to the renderer.
    pub fn roughness(&self) -> f64 {
        match self {
            Sloppiness::Architect => 0.0,
            Sloppiness::Artist => 1.0,
            Sloppiness::Cartoonist => 2.0,
        }
    }
}

/// Style properties for elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub stroke_color: SerializableColor,
    pub background_color: SerializableColor,
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_style: StrokeStyle,
    #[serde(default)]
    pub fill_style: FillStyle,
    #[serde(default)]
    pub corner_style: CornerStyle,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub sloppiness: Sloppiness,
    /// Seed for the hand-drawn effect (keeps rendering stable across transforms).
    #[serde(default = "generate_seed")]
    pub seed: u32,
}

fn default_opacity() -> f64 {
    1.0
}

/// Generate a seed for new elements.
/// Counter mixed through a splitmix32-style hash, so it works without a clock.
pub(crate) fn generate_seed() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEED_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut x = counter.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

impl ElementStyle {
    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        let alpha = (self.stroke_color.a as f64 * self.opacity.clamp(0.0, 1.0)) as u8;
        Color::from_rgba8(self.stroke_color.r, self.stroke_color.g, self.stroke_color.b, alpha)
    }

    /// Get the fill color with opacity applied (None when not filled).
    pub fn fill_with_opacity(&self) -> Option<Color> {
        if self.fill_style == FillStyle::Transparent || self.background_color.is_transparent() {
            return None;
        }
        let c = self.background_color;
        let alpha = (c.a as f64 * self.opacity.clamp(0.0, 1.0)) as u8;
        Some(Color::from_rgba8(c.r, c.g, c.b, alpha))
    }

    /// Copy every visual attribute from `other`, keeping this style's seed.
    pub fn paste_from(&mut self, other: &ElementStyle) {
        let seed = self.seed;
        *self = other.clone();
        self.seed = seed;
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            background_color: SerializableColor::transparent(),
            stroke_width: 2.0,
            stroke_style: StrokeStyle::default(),
            fill_style: FillStyle::default(),
            corner_style: CornerStyle::default(),
            opacity: 1.0,
            sloppiness: Sloppiness::default(),
            seed: generate_seed(),
        }
    }
}
