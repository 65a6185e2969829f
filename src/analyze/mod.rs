//! Reference-image analysis.
//!
//! Distills an arbitrary reference image into the compact, semantic pieces a
//! pixel-art recreation needs:
//!
//! - [`palette`](self::analyze) - k-means extracted palette sorted by hue,
//!   with per-entry usage share
//! - [`brightness`] - downsampled, level-quantized brightness grid
//! - [`edges`] - Sobel edge map and major contours at source resolution
//! - [`composition`] - rule-of-thirds lines and focal points
//! - [`zones`] - dithering-zone suggestions over the brightness grid
//!
//! plus scalar metadata: dominant hue, color harmony and contrast band.

pub mod brightness;
pub mod composition;
pub mod edges;
pub mod zones;

use image::RgbaImage;
use thiserror::Error;

use crate::color::{distance_sq, hue_distance, rgb_to_hsl};
use crate::models::{
    AnalysisMetadata, ColorHarmony, ContrastBand, PaletteColor, ReferenceAnalysis,
};
use crate::quantize::{collect_weighted_colors, kmeans};

/// Valid range for the extracted palette size.
pub const MIN_PALETTE_SIZE: usize = 5;
/// Valid range for the extracted palette size.
pub const MAX_PALETTE_SIZE: usize = 32;
/// Valid range for brightness quantization levels.
pub const MIN_BRIGHTNESS_LEVELS: u8 = 2;
/// Valid range for brightness quantization levels.
pub const MAX_BRIGHTNESS_LEVELS: u8 = 10;

/// Error type for analysis failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    /// Requested grid size had a zero dimension
    #[error("target size must be at least 1x1, got {width}x{height}")]
    TargetSizeEmpty { width: u32, height: u32 },
    /// `palette_size` outside `[5, 32]`
    #[error("palette size must be in [{MIN_PALETTE_SIZE}, {MAX_PALETTE_SIZE}], got {0}")]
    PaletteSizeOutOfRange(usize),
    /// `brightness_levels` outside `[2, 10]`
    #[error(
        "brightness levels must be in [{MIN_BRIGHTNESS_LEVELS}, {MAX_BRIGHTNESS_LEVELS}], got {0}"
    )]
    BrightnessLevelsOutOfRange(u8),
}

/// Analyze a reference image.
///
/// `target_width`/`target_height` size the brightness grid (the intended
/// pixel-art canvas); the edge map stays at source resolution. An empty
/// source yields empty palette/grids rather than an error.
///
/// # Errors
///
/// Range violations are rejected before any pixels are read.
pub fn analyze(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
    palette_size: usize,
    brightness_levels: u8,
    edge_threshold: u8,
) -> Result<ReferenceAnalysis, AnalyzeError> {
    if target_width == 0 || target_height == 0 {
        return Err(AnalyzeError::TargetSizeEmpty { width: target_width, height: target_height });
    }
    if palette_size < MIN_PALETTE_SIZE || palette_size > MAX_PALETTE_SIZE {
        return Err(AnalyzeError::PaletteSizeOutOfRange(palette_size));
    }
    if brightness_levels < MIN_BRIGHTNESS_LEVELS || brightness_levels > MAX_BRIGHTNESS_LEVELS {
        return Err(AnalyzeError::BrightnessLevelsOutOfRange(brightness_levels));
    }

    let palette = extract_palette(image, palette_size);
    let brightness = brightness::brightness_map(image, target_width, target_height, brightness_levels);
    let edge_map = edges::edge_map(image, edge_threshold);
    let composition = composition::composition(&edge_map.grid, image.width(), image.height());
    let edge_fraction =
        cell_edge_fraction(&edge_map.grid, image.width(), image.height(), target_width, target_height);
    let dithering_zones = zones::dithering_zones(&brightness, &edge_fraction, &palette);

    let metadata = AnalysisMetadata {
        scale_factor: if image.width() == 0 {
            0.0
        } else {
            f64::from(target_width) / f64::from(image.width())
        },
        dominant_hue: dominant_hue(&palette),
        color_harmony: classify_harmony(&palette),
        contrast_ratio: classify_contrast(&palette),
    };

    Ok(ReferenceAnalysis {
        palette,
        brightness,
        edges: edge_map,
        composition,
        dithering_zones,
        metadata,
    })
}

/// K-means palette with usage share, sorted by hue then lightness.
fn extract_palette(image: &RgbaImage, palette_size: usize) -> Vec<PaletteColor> {
    let colors = collect_weighted_colors(image, true);
    if colors.is_empty() {
        return Vec::new();
    }
    let centers = kmeans::palette(&colors, palette_size);
    if centers.is_empty() {
        return Vec::new();
    }

    // Usage: every non-transparent pixel votes for its nearest entry
    let mut votes = vec![0u64; centers.len()];
    let mut total = 0u64;
    for &(color, count) in &colors {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, &center) in centers.iter().enumerate() {
            let d = distance_sq(color, center);
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        votes[best] += u64::from(count);
        total += u64::from(count);
    }

    let mut entries: Vec<PaletteColor> = centers
        .iter()
        .zip(&votes)
        .map(|(&center, &vote)| {
            let usage = if total == 0 { 0.0 } else { vote as f64 / total as f64 * 100.0 };
            PaletteColor::from_rgba(center, usage)
        })
        .collect();

    entries.sort_by(|a, b| {
        a.hue
            .partial_cmp(&b.hue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.lightness.partial_cmp(&b.lightness).unwrap_or(std::cmp::Ordering::Equal))
    });
    entries
}

/// Share of edge pixels behind each brightness-grid cell.
fn cell_edge_fraction(
    edge_grid: &[Vec<bool>],
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
) -> Vec<Vec<f64>> {
    if src_w == 0 || src_h == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(target_h as usize);
    for cell_y in 0..target_h {
        let mut row = Vec::with_capacity(target_w as usize);
        for cell_x in 0..target_w {
            let x0 = cell_x * src_w / target_w;
            let x1 = (((cell_x + 1) * src_w).div_ceil(target_w)).min(src_w).max(x0 + 1);
            let y0 = cell_y * src_h / target_h;
            let y1 = (((cell_y + 1) * src_h).div_ceil(target_h)).min(src_h).max(y0 + 1);

            let mut edges_in_cell = 0usize;
            let mut count = 0usize;
            for y in y0..y1 {
                for x in x0..x1 {
                    if edge_grid[y as usize][x as usize] {
                        edges_in_cell += 1;
                    }
                    count += 1;
                }
            }
            row.push(edges_in_cell as f64 / count as f64);
        }
        out.push(row);
    }
    out
}

/// Usage-weighted circular mean of palette hues, in degrees.
fn dominant_hue(palette: &[PaletteColor]) -> f64 {
    let mut x = 0.0;
    let mut y = 0.0;
    for entry in palette {
        let radians = entry.hue.to_radians();
        x += entry.usage_percent * radians.cos();
        y += entry.usage_percent * radians.sin();
    }
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Hue-relationship classification.
fn classify_harmony(palette: &[PaletteColor]) -> ColorHarmony {
    if palette.is_empty() {
        return ColorHarmony::Diverse;
    }
    let hues: Vec<f64> = palette.iter().map(|entry| entry.hue).collect();
    let mut max_dist: f64 = 0.0;
    for i in 0..hues.len() {
        for j in (i + 1)..hues.len() {
            max_dist = max_dist.max(hue_distance(hues[i], hues[j]));
        }
    }

    // Opposing hue pair
    if max_dist >= 150.0 {
        return ColorHarmony::Complementary;
    }
    // Everything in one tight arc
    if max_dist < 60.0 {
        return ColorHarmony::Analogous;
    }
    // Three 120-degree segments all populated
    if hues.len() >= 3 {
        let mut segments = [false; 3];
        for &hue in &hues {
            segments[(hue / 120.0) as usize % 3] = true;
        }
        if segments.iter().all(|&populated| populated) {
            return ColorHarmony::Triadic;
        }
    }
    ColorHarmony::Diverse
}

/// Contrast band from the lightness spread, in percent of full range.
fn classify_contrast(palette: &[PaletteColor]) -> ContrastBand {
    let mut min_l = f64::MAX;
    let mut max_l = f64::MIN;
    for entry in palette {
        min_l = min_l.min(entry.lightness);
        max_l = max_l.max(entry.lightness);
    }
    if palette.is_empty() {
        return ContrastBand::Low;
    }
    let spread = (max_l - min_l) * 100.0;
    if spread < 30.0 {
        ContrastBand::Low
    } else if spread <= 60.0 {
        ContrastBand::Medium
    } else {
        ContrastBand::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn entry(r: u8, g: u8, b: u8, usage: f64) -> PaletteColor {
        PaletteColor::from_rgba(Rgba([r, g, b, 255]), usage)
    }

    #[test]
    fn test_parameter_validation_order() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        assert_eq!(
            analyze(&img, 0, 8, 8, 4, 50),
            Err(AnalyzeError::TargetSizeEmpty { width: 0, height: 8 })
        );
        assert_eq!(analyze(&img, 8, 8, 4, 4, 50), Err(AnalyzeError::PaletteSizeOutOfRange(4)));
        assert_eq!(analyze(&img, 8, 8, 33, 4, 50), Err(AnalyzeError::PaletteSizeOutOfRange(33)));
        assert_eq!(
            analyze(&img, 8, 8, 8, 1, 50),
            Err(AnalyzeError::BrightnessLevelsOutOfRange(1))
        );
        assert_eq!(
            analyze(&img, 8, 8, 8, 11, 50),
            Err(AnalyzeError::BrightnessLevelsOutOfRange(11))
        );
    }

    #[test]
    fn test_empty_image_analyzes_to_empty_results() {
        let img = RgbaImage::new(0, 0);
        let result = analyze(&img, 8, 8, 8, 4, 50).unwrap();
        assert!(result.palette.is_empty());
        assert!(result.brightness.grid.is_empty());
        assert!(result.edges.grid.is_empty());
        assert!(result.dithering_zones.is_empty());
        assert_eq!(result.metadata.scale_factor, 0.0);
    }

    #[test]
    fn test_palette_sorted_by_hue_and_usage_sums_to_100() {
        let mut img = RgbaImage::new(8, 8);
        let colors = [
            Rgba([200, 30, 30, 255]),
            Rgba([30, 200, 30, 255]),
            Rgba([30, 30, 200, 255]),
            Rgba([220, 220, 40, 255]),
            Rgba([40, 220, 220, 255]),
        ];
        for (i, pixel) in img.pixels_mut().enumerate() {
            *pixel = colors[i % colors.len()];
        }
        let result = analyze(&img, 8, 8, 5, 4, 50).unwrap();
        assert!(result.palette.len() <= 5);
        for pair in result.palette.windows(2) {
            assert!(pair[0].hue <= pair[1].hue, "palette must sort by hue");
        }
        let total: f64 = result.palette.iter().map(|entry| entry.usage_percent).sum();
        assert!((total - 100.0).abs() < 1e-6, "usage sums to 100, got {total}");
    }

    #[test]
    fn test_brightness_grid_spans_target_size() {
        let img = RgbaImage::from_pixel(64, 48, Rgba([90, 90, 90, 255]));
        let result = analyze(&img, 16, 12, 5, 4, 50).unwrap();
        assert_eq!(result.brightness.width(), 16);
        assert_eq!(result.brightness.height(), 12);
        assert_eq!(result.metadata.scale_factor, 0.25);
    }

    #[test]
    fn test_bw_image_reads_high_contrast() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        for y in 0..10 {
            for x in 5..10 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let result = analyze(&img, 10, 10, 5, 4, 100).unwrap();
        assert_eq!(result.metadata.contrast_ratio, ContrastBand::High);
    }

    #[test]
    fn test_dominant_hue_weighted_by_usage() {
        let palette = vec![entry(255, 0, 0, 90.0), entry(0, 0, 255, 10.0)];
        let hue = dominant_hue(&palette);
        // Mostly red: the mean leans toward 0/360 rather than 240
        assert!(hue_distance(hue, 0.0) < 45.0, "hue = {hue}");
    }

    #[test]
    fn test_harmony_complementary() {
        let palette = vec![entry(255, 0, 0, 50.0), entry(0, 255, 255, 50.0)];
        assert_eq!(classify_harmony(&palette), ColorHarmony::Complementary);
    }

    #[test]
    fn test_harmony_analogous() {
        let palette =
            vec![entry(255, 0, 0, 40.0), entry(255, 128, 0, 30.0), entry(255, 200, 0, 30.0)];
        assert_eq!(classify_harmony(&palette), ColorHarmony::Analogous);
    }

    #[test]
    fn test_harmony_triadic() {
        let palette =
            vec![entry(255, 0, 0, 34.0), entry(0, 255, 0, 33.0), entry(0, 0, 255, 33.0)];
        // Red 0, green 120, blue 240: max circular distance is 120
        assert_eq!(classify_harmony(&palette), ColorHarmony::Triadic);
    }

    #[test]
    fn test_harmony_diverse() {
        let palette = vec![entry(255, 0, 0, 50.0), entry(0, 255, 0, 50.0)];
        // Two hues 120 apart: not a pair, not an arc, not a triad
        assert_eq!(classify_harmony(&palette), ColorHarmony::Diverse);
    }

    #[test]
    fn test_contrast_bands() {
        assert_eq!(
            classify_contrast(&[entry(100, 100, 100, 50.0), entry(120, 120, 120, 50.0)]),
            ContrastBand::Low
        );
        assert_eq!(
            classify_contrast(&[entry(60, 60, 60, 50.0), entry(180, 180, 180, 50.0)]),
            ContrastBand::Medium
        );
        assert_eq!(
            classify_contrast(&[entry(0, 0, 0, 50.0), entry(255, 255, 255, 50.0)]),
            ContrastBand::High
        );
    }
}
