//! Palette entry and quantization result types.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::color::{format_hex, rgb_to_hsl};

/// One palette entry with its HSL breakdown and how much of the image uses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteColor {
    /// Hex form, `#RRGGBB` or `#RRGGBBAA`
    pub hex: String,
    /// Hue in degrees, `[0, 360)`
    pub hue: f64,
    /// Saturation, `[0, 1]`
    pub saturation: f64,
    /// Lightness, `[0, 1]`
    pub lightness: f64,
    /// Share of non-transparent source pixels nearest this entry, `[0, 100]`
    pub usage_percent: f64,
}

impl PaletteColor {
    /// Build an entry from a color and its usage share.
    pub fn from_rgba(color: Rgba<u8>, usage_percent: f64) -> Self {
        let Rgba([r, g, b, _]) = color;
        let (hue, saturation, lightness) = rgb_to_hsl(r, g, b);
        Self { hex: format_hex(color), hue, saturation, lightness, usage_percent }
    }
}

/// Result of a palette quantization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantizationResult {
    /// The reduced palette as hex strings, at most the requested size
    pub palette: Vec<String>,
    /// Distinct RGBA values in the source image
    pub original_color_count: usize,
    /// Which algorithm produced the palette
    pub algorithm_used: String,
}
