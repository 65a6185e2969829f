//! Two-color dither fills.
//!
//! Fills a region with a blend of two colors without alpha transparency,
//! using either ordered thresholding (Bayer matrices, checkerboard, line
//! textures, seeded noise) or Floyd-Steinberg error diffusion. Ordered
//! patterns compare a fixed per-position threshold in `[0, 1)` against the
//! requested density: the pixel takes `color2` when `threshold < density`.

use clap::ValueEnum;
use image::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Pixel, Region};

/// Error type for dither fill failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DitherError {
    /// `density` outside `[0, 1]`
    #[error("density must be in [0, 1], got {0}")]
    DensityOutOfRange(f64),
}

/// Built-in dither pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DitherPattern {
    /// 2x2 checkerboard
    Checker,
    /// 2x2 Bayer ordered matrix (4 threshold levels)
    Bayer2x2,
    /// 4x4 Bayer ordered matrix (16 threshold levels)
    Bayer4x4,
    /// 8x8 Bayer ordered matrix (64 threshold levels)
    Bayer8x8,
    /// Diagonal line texture
    Diagonal,
    /// Horizontal line texture
    Horizontal,
    /// Vertical line texture
    Vertical,
    /// Seeded hash noise texture
    Noise,
    /// Floyd-Steinberg error diffusion
    FloydSteinberg,
}

/// 2x2 Bayer matrix, thresholds out of 4.
const BAYER_2X2: [[u8; 2]; 2] = [[0, 2], [3, 1]];

/// 4x4 Bayer matrix, thresholds out of 16.
const BAYER_4X4: [[u8; 4]; 4] =
    [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// 8x8 Bayer matrix, thresholds out of 64.
const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Line textures repeat every 4 pixels.
const LINE_PERIOD: u32 = 4;

impl DitherPattern {
    /// Parse a pattern name. Accepts the bayer-N and ordered-N spellings.
    pub fn from_name(s: &str) -> Option<DitherPattern> {
        match s.to_lowercase().as_str() {
            "checker" | "checkerboard" => Some(DitherPattern::Checker),
            "bayer2x2" | "bayer-2x2" | "ordered2x2" | "ordered-2x2" => {
                Some(DitherPattern::Bayer2x2)
            }
            "bayer4x4" | "bayer-4x4" | "ordered4x4" | "ordered-4x4" => {
                Some(DitherPattern::Bayer4x4)
            }
            "bayer8x8" | "bayer-8x8" | "ordered8x8" | "ordered-8x8" => {
                Some(DitherPattern::Bayer8x8)
            }
            "diagonal" => Some(DitherPattern::Diagonal),
            "horizontal" => Some(DitherPattern::Horizontal),
            "vertical" => Some(DitherPattern::Vertical),
            "noise" | "random" => Some(DitherPattern::Noise),
            "floyd_steinberg" | "floyd-steinberg" | "fs" | "error_diffusion" => {
                Some(DitherPattern::FloydSteinberg)
            }
            _ => None,
        }
    }

    /// Whether this pattern thresholds per-position (vs. diffusing error).
    pub fn is_ordered(&self) -> bool {
        !matches!(self, DitherPattern::FloydSteinberg)
    }

    /// Threshold in `[0, 1)` at image position `(x, y)` for ordered patterns.
    ///
    /// Floyd-Steinberg has no positional threshold; it reports the midpoint.
    pub fn threshold_at(&self, x: u32, y: u32, seed: u64) -> f64 {
        match self {
            DitherPattern::Checker => {
                if (x + y) % 2 == 0 {
                    0.25
                } else {
                    0.75
                }
            }
            DitherPattern::Bayer2x2 => {
                f64::from(BAYER_2X2[(y % 2) as usize][(x % 2) as usize]) / 4.0
            }
            DitherPattern::Bayer4x4 => {
                f64::from(BAYER_4X4[(y % 4) as usize][(x % 4) as usize]) / 16.0
            }
            DitherPattern::Bayer8x8 => {
                f64::from(BAYER_8X8[(y % 8) as usize][(x % 8) as usize]) / 64.0
            }
            DitherPattern::Diagonal => {
                f64::from((x + y) % LINE_PERIOD) / f64::from(LINE_PERIOD)
            }
            DitherPattern::Horizontal => f64::from(y % LINE_PERIOD) / f64::from(LINE_PERIOD),
            DitherPattern::Vertical => f64::from(x % LINE_PERIOD) / f64::from(LINE_PERIOD),
            DitherPattern::Noise => {
                // Splitmix-style hash keeps the mask fixed per position
                let mut hash = seed;
                hash ^= u64::from(x).wrapping_mul(0x9E3779B97F4A7C15);
                hash ^= u64::from(y).wrapping_mul(0xBF58476D1CE4E5B9);
                hash = hash.wrapping_mul(0x94D049BB133111EB);
                hash ^= hash >> 30;
                (hash >> 11) as f64 / (1u64 << 53) as f64
            }
            DitherPattern::FloydSteinberg => 0.5,
        }
    }
}

impl std::fmt::Display for DitherPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DitherPattern::Checker => write!(f, "checker"),
            DitherPattern::Bayer2x2 => write!(f, "bayer2x2"),
            DitherPattern::Bayer4x4 => write!(f, "bayer4x4"),
            DitherPattern::Bayer8x8 => write!(f, "bayer8x8"),
            DitherPattern::Diagonal => write!(f, "diagonal"),
            DitherPattern::Horizontal => write!(f, "horizontal"),
            DitherPattern::Vertical => write!(f, "vertical"),
            DitherPattern::Noise => write!(f, "noise"),
            DitherPattern::FloydSteinberg => write!(f, "floyd_steinberg"),
        }
    }
}

/// Fill a region with a two-color dither at the requested density.
///
/// `density` is the target share of `color2`: 0 fills entirely with
/// `color1`, 1 entirely with `color2`, in every mode. Ordered patterns
/// threshold against absolute image coordinates so adjacent fills tile
/// seamlessly. Returns one pixel per region cell, row-major.
///
/// # Errors
///
/// `DitherError::DensityOutOfRange` when `density` is outside `[0, 1]`,
/// before any pixels are produced.
pub fn fill_dither(
    region: Region,
    color1: Rgba<u8>,
    color2: Rgba<u8>,
    pattern: DitherPattern,
    density: f64,
) -> Result<Vec<Pixel>, DitherError> {
    if !(0.0..=1.0).contains(&density) || density.is_nan() {
        return Err(DitherError::DensityOutOfRange(density));
    }

    if pattern.is_ordered() {
        let mut pixels = Vec::with_capacity(region.area() as usize);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                let color =
                    if pattern.threshold_at(x, y, 0) < density { color2 } else { color1 };
                pixels.push(Pixel::new(x, y, color));
            }
        }
        Ok(pixels)
    } else {
        Ok(fill_error_diffusion(region, color1, color2, density))
    }
}

/// Floyd-Steinberg fill.
///
/// Works on the normalized position between the two colors: the target value
/// is `density`, the midpoint 0.5, and the carried error is clamped so the
/// accumulated value stays in `[0, 1]` (this also keeps equal-luminance color
/// pairs dithering sensibly). Error spreads right, below-left, below and
/// below-right at 7/16, 3/16, 5/16, 1/16.
fn fill_error_diffusion(
    region: Region,
    color1: Rgba<u8>,
    color2: Rgba<u8>,
    density: f64,
) -> Vec<Pixel> {
    let width = region.width as usize;
    let height = region.height as usize;
    let mut errors = vec![0f64; width * height];
    let mut pixels = Vec::with_capacity(width * height);

    for row in 0..height {
        for col in 0..width {
            let value = (density + errors[row * width + col]).clamp(0.0, 1.0);
            let (color, remainder) =
                if value >= 0.5 { (color2, value - 1.0) } else { (color1, value) };
            pixels.push(Pixel::new(region.x + col as u32, region.y + row as u32, color));

            for (dx, dy, weight) in
                [(1i64, 0i64, 7.0 / 16.0), (-1, 1, 3.0 / 16.0), (0, 1, 5.0 / 16.0), (1, 1, 1.0 / 16.0)]
            {
                let nc = col as i64 + dx;
                let nr = row as i64 + dy;
                if nc < 0 || nc >= width as i64 || nr >= height as i64 {
                    continue;
                }
                errors[nr as usize * width + nc as usize] += remainder * weight;
            }
        }
    }
    pixels
}
