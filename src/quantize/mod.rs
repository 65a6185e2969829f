//! Palette quantization.
//!
//! Reduces an image to at most N representative colors via one of three
//! interchangeable strategies:
//!
//! - [`median_cut`] - recursive box subdivision along the widest channel
//! - [`kmeans`] - Lloyd's algorithm with deterministic seeding
//! - [`octree`] - bit-plane color tree with smallest-first merging
//!
//! All three consume the image's unique colors with per-color pixel counts,
//! so cost scales with color variety rather than raw pixel count. The
//! [`remap`] module maps pixels back onto a finished palette, optionally with
//! error-diffusion dithering.

pub mod kmeans;
pub mod median_cut;
pub mod octree;
pub mod remap;

pub use remap::remap_to_palette;

use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::format_hex;
use crate::models::QuantizationResult;

/// Valid range for the requested palette size.
pub const MIN_TARGET_COLORS: usize = 2;
/// Valid range for the requested palette size.
pub const MAX_TARGET_COLORS: usize = 256;

/// Error type for quantization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    /// `target_colors` outside `[2, 256]`
    #[error("target colors must be in [{MIN_TARGET_COLORS}, {MAX_TARGET_COLORS}], got {0}")]
    TargetColorsOutOfRange(usize),
}

/// Quantization strategy selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QuantizeAlgorithm {
    /// Recursive box subdivision; good general-purpose default
    #[default]
    MedianCut,
    /// Lloyd's k-means; best color fidelity, slowest
    Kmeans,
    /// Octree merging; fastest on color-rich images
    Octree,
}

impl QuantizeAlgorithm {
    /// Parse an algorithm name. Accepts snake_case and kebab-case spellings.
    pub fn from_name(s: &str) -> Option<QuantizeAlgorithm> {
        match s.to_lowercase().as_str() {
            "median_cut" | "median-cut" | "mediancut" => Some(QuantizeAlgorithm::MedianCut),
            "kmeans" | "k-means" | "k_means" => Some(QuantizeAlgorithm::Kmeans),
            "octree" => Some(QuantizeAlgorithm::Octree),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuantizeAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantizeAlgorithm::MedianCut => write!(f, "median_cut"),
            QuantizeAlgorithm::Kmeans => write!(f, "kmeans"),
            QuantizeAlgorithm::Octree => write!(f, "octree"),
        }
    }
}

/// A unique color paired with how many pixels carry it.
pub(crate) type WeightedColor = (Rgba<u8>, u32);

/// Reduce an image to at most `target_colors` representative colors.
///
/// With `preserve_transparency`, fully transparent pixels (`alpha == 0`) are
/// excluded from clustering and receive no palette entry; otherwise alpha is
/// ignored and only RGB is clustered.
///
/// The returned palette may be smaller than `target_colors` when the image
/// has fewer unique colors. `original_color_count` counts distinct RGBA
/// values in the source, transparency included. An empty image yields an
/// empty palette rather than an error.
///
/// # Errors
///
/// `QuantizeError::TargetColorsOutOfRange` when `target_colors` falls outside
/// `[2, 256]`; validation happens before any pixels are read.
pub fn quantize(
    image: &RgbaImage,
    target_colors: usize,
    algorithm: QuantizeAlgorithm,
    preserve_transparency: bool,
) -> Result<QuantizationResult, QuantizeError> {
    if target_colors < MIN_TARGET_COLORS || target_colors > MAX_TARGET_COLORS {
        return Err(QuantizeError::TargetColorsOutOfRange(target_colors));
    }

    let original_color_count = count_distinct_rgba(image);
    let colors = collect_weighted_colors(image, preserve_transparency);

    let palette = if colors.is_empty() {
        Vec::new()
    } else {
        match algorithm {
            QuantizeAlgorithm::MedianCut => median_cut::palette(&colors, target_colors),
            QuantizeAlgorithm::Kmeans => kmeans::palette(&colors, target_colors),
            QuantizeAlgorithm::Octree => octree::palette(&colors, target_colors),
        }
    };

    Ok(QuantizationResult {
        palette: palette.into_iter().map(format_hex).collect(),
        original_color_count,
        algorithm_used: algorithm.to_string(),
    })
}

/// Count distinct RGBA values across the whole image, alpha included.
fn count_distinct_rgba(image: &RgbaImage) -> usize {
    let seen: HashSet<[u8; 4]> = image.pixels().map(|pixel| pixel.0).collect();
    seen.len()
}

/// Collect unique clustering inputs with pixel counts.
///
/// Sorted by packed RGBA value so every algorithm sees the same insertion
/// order regardless of pixel layout - quantization stays reproducible.
pub(crate) fn collect_weighted_colors(
    image: &RgbaImage,
    preserve_transparency: bool,
) -> Vec<WeightedColor> {
    let mut counts: HashMap<[u8; 4], u32> = HashMap::new();
    for pixel in image.pixels() {
        if preserve_transparency && pixel.0[3] == 0 {
            continue;
        }
        let mut key = pixel.0;
        if !preserve_transparency {
            // Alpha is ignored entirely in this mode
            key[3] = 255;
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut colors: Vec<WeightedColor> =
        counts.into_iter().map(|(ch, count)| (Rgba(ch), count)).collect();
    colors.sort_unstable_by_key(|(c, _)| u32::from_be_bytes(c.0));
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(w: u32, h: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(w, h, color)
    }

    #[test]
    fn test_algorithm_from_name() {
        assert_eq!(QuantizeAlgorithm::from_name("median_cut"), Some(QuantizeAlgorithm::MedianCut));
        assert_eq!(QuantizeAlgorithm::from_name("median-cut"), Some(QuantizeAlgorithm::MedianCut));
        assert_eq!(QuantizeAlgorithm::from_name("KMeans"), Some(QuantizeAlgorithm::Kmeans));
        assert_eq!(QuantizeAlgorithm::from_name("octree"), Some(QuantizeAlgorithm::Octree));
        assert_eq!(QuantizeAlgorithm::from_name("popularity"), None);
    }

    #[test]
    fn test_algorithm_display_matches_serde() {
        for algo in
            [QuantizeAlgorithm::MedianCut, QuantizeAlgorithm::Kmeans, QuantizeAlgorithm::Octree]
        {
            let json = serde_json::to_string(&algo).unwrap();
            assert_eq!(json, format!("\"{algo}\""));
        }
    }

    #[test]
    fn test_target_colors_validated_first() {
        let img = solid_image(4, 4, Rgba([10, 20, 30, 255]));
        for bad in [0, 1, 257, 1000] {
            let err = quantize(&img, bad, QuantizeAlgorithm::MedianCut, true).unwrap_err();
            assert_eq!(err, QuantizeError::TargetColorsOutOfRange(bad));
        }
    }

    #[test]
    fn test_solid_image_quantizes_to_one_color_all_algorithms() {
        let img = solid_image(8, 8, Rgba([200, 100, 50, 255]));
        for algo in
            [QuantizeAlgorithm::MedianCut, QuantizeAlgorithm::Kmeans, QuantizeAlgorithm::Octree]
        {
            let result = quantize(&img, 16, algo, true).unwrap();
            assert_eq!(result.palette, vec!["#C86432".to_string()], "{algo}");
            assert_eq!(result.original_color_count, 1);
        }
    }

    #[test]
    fn test_empty_image_is_not_an_error() {
        let img = RgbaImage::new(0, 0);
        for algo in
            [QuantizeAlgorithm::MedianCut, QuantizeAlgorithm::Kmeans, QuantizeAlgorithm::Octree]
        {
            let result = quantize(&img, 8, algo, true).unwrap();
            assert!(result.palette.is_empty());
            assert_eq!(result.original_color_count, 0);
        }
    }

    #[test]
    fn test_fully_transparent_image_preserving_transparency() {
        let img = solid_image(4, 4, Rgba([9, 9, 9, 0]));
        let result = quantize(&img, 8, QuantizeAlgorithm::MedianCut, true).unwrap();
        assert!(result.palette.is_empty());
        // The transparent value itself is still one distinct RGBA color
        assert_eq!(result.original_color_count, 1);
    }

    #[test]
    fn test_palette_never_exceeds_target() {
        let mut img = RgbaImage::new(16, 16);
        for (i, pixel) in img.pixels_mut().enumerate() {
            *pixel = Rgba([(i % 256) as u8, (i * 7 % 256) as u8, (i * 13 % 256) as u8, 255]);
        }
        for algo in
            [QuantizeAlgorithm::MedianCut, QuantizeAlgorithm::Kmeans, QuantizeAlgorithm::Octree]
        {
            for k in [2, 4, 16] {
                let result = quantize(&img, k, algo, true).unwrap();
                assert!(result.palette.len() <= k, "{algo} k={k} got {}", result.palette.len());
                assert!(!result.palette.is_empty());
            }
        }
    }

    #[test]
    fn test_quantize_is_idempotent_on_already_quantized_images() {
        // Four distinct colors, target 4: every algorithm must return exactly
        // those colors, and re-quantizing the remapped image changes nothing.
        let colors =
            [Rgba([0, 0, 0, 255]), Rgba([255, 0, 0, 255]), Rgba([0, 255, 0, 255]), Rgba([0, 0, 255, 255])];
        let mut img = RgbaImage::new(8, 8);
        for (i, pixel) in img.pixels_mut().enumerate() {
            *pixel = colors[i % 4];
        }
        for algo in
            [QuantizeAlgorithm::MedianCut, QuantizeAlgorithm::Kmeans, QuantizeAlgorithm::Octree]
        {
            let first = quantize(&img, 4, algo, true).unwrap();
            let mut sorted = first.palette.clone();
            sorted.sort();
            assert_eq!(sorted, vec!["#000000", "#0000FF", "#00FF00", "#FF0000"], "{algo}");

            let second = quantize(&img, 4, algo, true).unwrap();
            assert_eq!(first.palette, second.palette, "{algo} must be stable");
        }
    }

    #[test]
    fn test_transparency_ignored_when_not_preserving() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([100, 100, 100, 0]));
        img.put_pixel(1, 0, Rgba([100, 100, 100, 255]));
        img.put_pixel(0, 1, Rgba([100, 100, 100, 128]));
        img.put_pixel(1, 1, Rgba([100, 100, 100, 64]));
        let result = quantize(&img, 4, QuantizeAlgorithm::MedianCut, false).unwrap();
        // All four pixels collapse to one RGB color once alpha is ignored
        assert_eq!(result.palette, vec!["#646464".to_string()]);
        assert_eq!(result.original_color_count, 4);
    }
}
