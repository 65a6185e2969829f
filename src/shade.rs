//! Directional auto-shading.
//!
//! Partitions an image into connected same-color regions and shades each one
//! against a chosen light direction. Every pixel gets a facing score - the
//! dot product of its normalized offset from the region centroid with the
//! light's unit vector - and the style decides how scores map to derived
//! shadow/highlight colors:
//!
//! - `cell`: hard shadow/base/highlight bands
//! - `smooth`: the same bands with checker dithering at the boundaries
//! - `soft`: a gentler single step applied only to strongly facing pixels
//!
//! Derived colors adjust the base color's HSL lightness, scaled by intensity;
//! with `hue_shift` enabled, shadows rotate toward blue and highlights toward
//! amber by a small fixed offset.

use std::collections::HashMap;

use clap::ValueEnum;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{format_hex, hsl_to_rgb, hue_distance, rgb_to_hsl};
use crate::dither::DitherPattern;

/// Facing score beyond which a pixel leaves the base band (cell/smooth).
const BAND_THRESHOLD: f64 = 0.33;
/// Facing score beyond which soft shading applies.
const SOFT_THRESHOLD: f64 = 0.5;
/// Lightness delta at full intensity for cell/smooth bands.
const LIGHTNESS_STEP: f64 = 0.18;
/// Lightness delta at full intensity for the soft style.
const SOFT_LIGHTNESS_STEP: f64 = 0.09;
/// How far shadows/highlights rotate when hue shifting, degrees.
const HUE_SHIFT_DEGREES: f64 = 20.0;
/// Shadows cool toward blue.
const COOL_HUE: f64 = 240.0;
/// Highlights warm toward amber.
const WARM_HUE: f64 = 50.0;

/// Error type for shading failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShadeError {
    /// `intensity` outside `[0, 1]`
    #[error("intensity must be in [0, 1], got {0}")]
    IntensityOutOfRange(f64),
}

/// Where the light comes from, 8 compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LightDirection {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl LightDirection {
    /// Parse a direction name. Accepts snake_case and kebab-case spellings.
    pub fn from_name(s: &str) -> Option<LightDirection> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "top" => Some(LightDirection::Top),
            "top_right" | "topright" => Some(LightDirection::TopRight),
            "right" => Some(LightDirection::Right),
            "bottom_right" | "bottomright" => Some(LightDirection::BottomRight),
            "bottom" => Some(LightDirection::Bottom),
            "bottom_left" | "bottomleft" => Some(LightDirection::BottomLeft),
            "left" => Some(LightDirection::Left),
            "top_left" | "topleft" => Some(LightDirection::TopLeft),
            _ => None,
        }
    }

    /// Unit vector pointing toward the light source, y axis downward.
    fn unit_vector(&self) -> (f64, f64) {
        let diag = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            LightDirection::Top => (0.0, -1.0),
            LightDirection::TopRight => (diag, -diag),
            LightDirection::Right => (1.0, 0.0),
            LightDirection::BottomRight => (diag, diag),
            LightDirection::Bottom => (0.0, 1.0),
            LightDirection::BottomLeft => (-diag, diag),
            LightDirection::Left => (-1.0, 0.0),
            LightDirection::TopLeft => (-diag, -diag),
        }
    }
}

impl std::fmt::Display for LightDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LightDirection::Top => "top",
            LightDirection::TopRight => "top_right",
            LightDirection::Right => "right",
            LightDirection::BottomRight => "bottom_right",
            LightDirection::Bottom => "bottom",
            LightDirection::BottomLeft => "bottom_left",
            LightDirection::Left => "left",
            LightDirection::TopLeft => "top_left",
        };
        write!(f, "{name}")
    }
}

/// Shading style selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ShadeStyle {
    /// Discrete shadow/mid/highlight bands with hard edges
    #[default]
    Cell,
    /// Banded ramp, dithered at band boundaries
    Smooth,
    /// Subtle single-step darkening/lightening
    Soft,
}

impl ShadeStyle {
    /// Parse a style name.
    pub fn from_name(s: &str) -> Option<ShadeStyle> {
        match s.to_lowercase().as_str() {
            "cell" | "cel" => Some(ShadeStyle::Cell),
            "smooth" => Some(ShadeStyle::Smooth),
            "soft" => Some(ShadeStyle::Soft),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShadeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShadeStyle::Cell => write!(f, "cell"),
            ShadeStyle::Smooth => write!(f, "smooth"),
            ShadeStyle::Soft => write!(f, "soft"),
        }
    }
}

/// Output of one shading pass.
#[derive(Debug, Clone)]
pub struct ShadingResult {
    /// The shaded raster
    pub shaded: RgbaImage,
    /// Newly derived colors as hex, for palette registration
    pub generated_colors: Vec<String>,
    /// Regions that received at least one shadow/highlight pixel
    pub regions_shaded: usize,
}

/// Relative tone of a derived color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Band {
    Shadow,
    Base,
    Highlight,
}

/// Shade an image against a light direction.
///
/// Connected same-color opaque regions shade independently; regions with
/// fewer than 2 pixels are skipped. Returns the shaded raster, every derived
/// color (deduplicated, in derivation order), and how many regions actually
/// changed.
///
/// # Errors
///
/// `ShadeError::IntensityOutOfRange` when `intensity` is outside `[0, 1]`.
pub fn shade(
    image: &RgbaImage,
    light: LightDirection,
    intensity: f64,
    style: ShadeStyle,
    hue_shift: bool,
) -> Result<ShadingResult, ShadeError> {
    if !(0.0..=1.0).contains(&intensity) || intensity.is_nan() {
        return Err(ShadeError::IntensityOutOfRange(intensity));
    }

    let mut shaded = image.clone();
    let mut generated: Vec<String> = Vec::new();
    let mut derived_cache: HashMap<([u8; 4], Band), Rgba<u8>> = HashMap::new();
    let mut regions_shaded = 0;
    let light_vec = light.unit_vector();

    for region in connected_regions(image) {
        if region.pixels.len() < 2 {
            continue;
        }

        let mut changed = false;
        for &(x, y) in &region.pixels {
            let facing = facing_score(x, y, region.centroid, light_vec);
            let band = match style {
                ShadeStyle::Cell | ShadeStyle::Smooth => {
                    banded(facing, style, x, y)
                }
                ShadeStyle::Soft => {
                    if facing <= -SOFT_THRESHOLD {
                        Band::Shadow
                    } else if facing >= SOFT_THRESHOLD {
                        Band::Highlight
                    } else {
                        Band::Base
                    }
                }
            };
            if band == Band::Base {
                continue;
            }

            let base = region.color;
            let derived = *derived_cache.entry((base.0, band)).or_insert_with(|| {
                let color = derive_color(base, band, style, intensity, hue_shift);
                if color != base {
                    let hex = format_hex(color);
                    if !generated.contains(&hex) {
                        generated.push(hex);
                    }
                }
                color
            });
            if derived != base {
                let alpha = shaded.get_pixel(x, y).0[3];
                shaded.put_pixel(x, y, Rgba([derived.0[0], derived.0[1], derived.0[2], alpha]));
                changed = true;
            }
        }
        if changed {
            regions_shaded += 1;
        }
    }

    Ok(ShadingResult { shaded, generated_colors: generated, regions_shaded })
}

/// Band assignment for cell/smooth styles; smooth dithers the boundaries.
fn banded(facing: f64, style: ShadeStyle, x: u32, y: u32) -> Band {
    match style {
        ShadeStyle::Smooth => {
            // Soften the cut lines: within a margin of each threshold the
            // checker pattern decides which side the pixel lands on
            let margin = 0.15;
            let checker = DitherPattern::Checker.threshold_at(x, y, 0);
            let adjust = (checker - 0.5) * 2.0 * margin;
            classify(facing + adjust)
        }
        _ => classify(facing),
    }
}

fn classify(facing: f64) -> Band {
    if facing <= -BAND_THRESHOLD {
        Band::Shadow
    } else if facing >= BAND_THRESHOLD {
        Band::Highlight
    } else {
        Band::Base
    }
}

fn facing_score(x: u32, y: u32, centroid: (f64, f64), light: (f64, f64)) -> f64 {
    let dx = f64::from(x) - centroid.0;
    let dy = f64::from(y) - centroid.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return 0.0;
    }
    (dx / len) * light.0 + (dy / len) * light.1
}

/// Derive a shadow or highlight color from a base color.
fn derive_color(
    base: Rgba<u8>,
    band: Band,
    style: ShadeStyle,
    intensity: f64,
    hue_shift: bool,
) -> Rgba<u8> {
    if intensity == 0.0 {
        // No effect to apply; skip the HSL round trip entirely
        return base;
    }
    let step = match style {
        ShadeStyle::Soft => SOFT_LIGHTNESS_STEP,
        _ => LIGHTNESS_STEP,
    } * intensity;

    let (mut h, s, l) = rgb_to_hsl(base.0[0], base.0[1], base.0[2]);
    let l = match band {
        Band::Shadow => (l - step).max(0.0),
        Band::Highlight => (l + step).min(1.0),
        Band::Base => l,
    };
    if hue_shift {
        let target = match band {
            Band::Shadow => COOL_HUE,
            Band::Highlight => WARM_HUE,
            Band::Base => h,
        };
        h = rotate_toward(h, target, HUE_SHIFT_DEGREES);
    }

    let (r, g, b) = hsl_to_rgb(h, s, l);
    Rgba([r, g, b, base.0[3]])
}

/// Rotate `hue` toward `target` along the shorter arc, at most `step` degrees.
fn rotate_toward(hue: f64, target: f64, step: f64) -> f64 {
    let dist = hue_distance(hue, target);
    if dist <= step {
        return target;
    }
    let forward = (target - hue).rem_euclid(360.0);
    if forward <= 180.0 {
        (hue + step).rem_euclid(360.0)
    } else {
        (hue - step).rem_euclid(360.0)
    }
}

/// A connected run of same-colored opaque pixels.
struct ColorRegion {
    color: Rgba<u8>,
    pixels: Vec<(u32, u32)>,
    centroid: (f64, f64),
}

/// Collect 4-connected same-color opaque regions in scan order.
fn connected_regions(image: &RgbaImage) -> Vec<ColorRegion> {
    let (width, height) = image.dimensions();
    let mut visited = vec![false; (width as usize) * (height as usize)];
    let idx = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;
    let mut regions = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            if visited[idx(start_x, start_y)] {
                continue;
            }
            let color = *image.get_pixel(start_x, start_y);
            visited[idx(start_x, start_y)] = true;
            if color.0[3] == 0 {
                continue;
            }

            let mut pixels = Vec::new();
            let mut stack = vec![(start_x, start_y)];
            let mut sum = (0f64, 0f64);
            while let Some((x, y)) = stack.pop() {
                pixels.push((x, y));
                sum.0 += f64::from(x);
                sum.1 += f64::from(y);
                let neighbors = [
                    (x.wrapping_sub(1), y),
                    (x + 1, y),
                    (x, y.wrapping_sub(1)),
                    (x, y + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx < width && ny < height && !visited[idx(nx, ny)] {
                        if *image.get_pixel(nx, ny) == color {
                            visited[idx(nx, ny)] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            let count = pixels.len() as f64;
            regions.push(ColorRegion {
                color,
                centroid: (sum.0 / count, sum.1 / count),
                pixels,
            });
        }
    }
    regions
}
