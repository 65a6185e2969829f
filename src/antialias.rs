//! Diagonal-edge antialiasing suggestions.
//!
//! Pixel-art diagonals read as hard staircases. This module scans every 2x2
//! block of a region for the four canonical stair-step patterns - two
//! same-colored pixels on a diagonal with an empty corner between them - and
//! proposes a blended pixel for the empty corner. The caller decides whether
//! to apply the suggestions; nothing here mutates the raster.
//!
//! The grid is a dense bounds-checked raster: a coordinate outside the image
//! simply reads as transparent.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::{blend, format_hex, nearest_in_palette};
use crate::models::Region;

/// Which way the detected staircase climbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StairDirection {
    DiagonalNe,
    DiagonalNw,
    DiagonalSe,
    DiagonalSw,
}

impl std::fmt::Display for StairDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StairDirection::DiagonalNe => write!(f, "diagonal_ne"),
            StairDirection::DiagonalNw => write!(f, "diagonal_nw"),
            StairDirection::DiagonalSe => write!(f, "diagonal_se"),
            StairDirection::DiagonalSw => write!(f, "diagonal_sw"),
        }
    }
}

/// A proposed fill pixel softening one staircase corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSuggestion {
    pub x: u32,
    pub y: u32,
    pub direction: StairDirection,
    /// Blended fill color as hex
    pub color: String,
}

/// Scan a region for stair-step patterns and propose blended fill pixels.
///
/// Each 2x2 block is checked for the four canonical patterns. On a match the
/// empty corner gets `blend(stair_color, corner_original)`, where an absent
/// or transparent corner contributes its stored channels (all zero when out
/// of bounds). With `use_palette`, the blended color snaps to the nearest
/// color already present in the region.
///
/// `_threshold` is reserved for tunable sensitivity; detection is currently
/// exact pattern match. Uniform regions and regions without transparent
/// corners produce no suggestions.
pub fn suggest(
    image: &RgbaImage,
    region: Region,
    _threshold: f64,
    use_palette: bool,
) -> Vec<EdgeSuggestion> {
    let palette = if use_palette { region_colors(image, region) } else { Vec::new() };
    let mut suggestions = Vec::new();

    let at = |x: u32, y: u32| -> Rgba<u8> {
        if x < image.width() && y < image.height() && region.contains(x, y) {
            *image.get_pixel(x, y)
        } else {
            Rgba([0, 0, 0, 0])
        }
    };
    let opaque = |c: Rgba<u8>| c.0[3] != 0;

    for y in region.y..region.bottom().saturating_sub(1) {
        for x in region.x..region.right().saturating_sub(1) {
            // Block corners: a b
            //                c d
            let a = at(x, y);
            let b = at(x + 1, y);
            let c = at(x, y + 1);
            let d = at(x + 1, y + 1);

            let mut push = |corner_x: u32,
                            corner_y: u32,
                            stair: Rgba<u8>,
                            corner: Rgba<u8>,
                            direction: StairDirection| {
                let mut blended = blend(stair, corner);
                if use_palette {
                    blended = nearest_in_palette(blended, &palette);
                }
                suggestions.push(EdgeSuggestion {
                    x: corner_x,
                    y: corner_y,
                    direction,
                    color: format_hex(blended),
                });
            };

            // "\" diagonal pair with an empty corner beside it
            if opaque(a) && a == d {
                if !opaque(c) {
                    push(x, y + 1, a, c, StairDirection::DiagonalNe);
                }
                if !opaque(b) {
                    push(x + 1, y, a, b, StairDirection::DiagonalSw);
                }
            }
            // "/" diagonal pair
            if opaque(b) && b == c {
                if !opaque(a) {
                    push(x, y, b, a, StairDirection::DiagonalSe);
                }
                if !opaque(d) {
                    push(x + 1, y + 1, b, d, StairDirection::DiagonalNw);
                }
            }
        }
    }
    suggestions
}

/// Distinct opaque colors inside the region, in scan order.
fn region_colors(image: &RgbaImage, region: Region) -> Vec<Rgba<u8>> {
    let mut colors = Vec::new();
    for y in region.y..region.bottom().min(image.height()) {
        for x in region.x..region.right().min(image.width()) {
            let pixel = *image.get_pixel(x, y);
            if pixel.0[3] != 0 && !colors.contains(&pixel) {
                colors.push(pixel);
            }
        }
    }
    colors
}
