//! Dithering-zone suggestions.
//!
//! Two scans over the brightness grid propose where dithering would improve
//! a pixel-art rendition of the reference:
//!
//! - gradient zones: row-wise monotonic increasing brightness runs of at
//!   least 3 cells, to be blended with a Bayer 4x4 ramp
//! - texture zones: 3x3 windows of uniform brightness with little edge
//!   activity, to be broken up with a checkerboard of the two palette colors
//!   nearest the window's gray
//!
//! Suggestions cap at [`MAX_ZONES`], earliest found first. Zone regions are
//! expressed in brightness-grid cells.

use image::Rgba;

use crate::color::{distance_sq, format_hex, parse_color};
use crate::models::{BrightnessMap, DitheringZone, PaletteColor, Region, ZoneKind};

/// Total suggestion cap.
pub const MAX_ZONES: usize = 5;
/// Gradient runs must span at least this many cells.
const MIN_RUN_CELLS: usize = 3;
/// Texture windows must stay under this edge fraction.
const LOW_EDGE_FRACTION: f64 = 0.1;
/// Texture window side, in grid cells.
const TEXTURE_WINDOW: usize = 3;

/// Suggest dithering zones from the brightness grid.
///
/// `edge_fraction[y][x]` is the share of edge pixels in the source area
/// behind grid cell `(x, y)`.
pub fn dithering_zones(
    map: &BrightnessMap,
    edge_fraction: &[Vec<f64>],
    palette: &[PaletteColor],
) -> Vec<DitheringZone> {
    let mut zones = Vec::new();
    gradient_zones(map, &mut zones);
    texture_zones(map, edge_fraction, palette, &mut zones);
    zones.truncate(MAX_ZONES);
    zones
}

/// Row-wise monotonic increasing brightness runs of 3+ cells.
///
/// A run may plateau but must rise overall; fully flat stretches are texture
/// candidates, not gradients.
fn gradient_zones(map: &BrightnessMap, zones: &mut Vec<DitheringZone>) {
    for (row_idx, row) in map.grid.iter().enumerate() {
        let mut start = 0usize;
        for i in 1..=row.len() {
            let rising = i < row.len() && row[i] >= row[i - 1];
            if rising {
                continue;
            }
            let len = i - start;
            if len >= MIN_RUN_CELLS && row[i - 1] > row[start] {
                let mid = row[start + len / 2];
                let (lo, hi) = adjacent_levels(mid, map.legend.len());
                zones.push(DitheringZone {
                    region: Region {
                        x: start as u32,
                        y: row_idx as u32,
                        width: len as u32,
                        height: 1,
                    },
                    kind: ZoneKind::Gradient,
                    colors: [gray_hex(map.legend[lo]), gray_hex(map.legend[hi])],
                    pattern: "bayer4x4".to_string(),
                    reason: format!("brightness rises monotonically across {len} cells"),
                });
            }
            start = i;
        }
    }
}

/// Non-overlapping 3x3 windows of uniform brightness and low edge activity.
fn texture_zones(
    map: &BrightnessMap,
    edge_fraction: &[Vec<f64>],
    palette: &[PaletteColor],
    zones: &mut Vec<DitheringZone>,
) {
    if palette.len() < 2 {
        return;
    }
    let height = map.height();
    let width = map.width();
    let mut window_y = 0;
    while window_y + TEXTURE_WINDOW <= height {
        let mut window_x = 0;
        while window_x + TEXTURE_WINDOW <= width {
            let level = map.grid[window_y][window_x];
            let mut uniform = true;
            let mut edge_sum = 0.0;
            for y in window_y..window_y + TEXTURE_WINDOW {
                for x in window_x..window_x + TEXTURE_WINDOW {
                    uniform &= map.grid[y][x] == level;
                    edge_sum += edge_fraction[y][x];
                }
            }
            let edge_avg = edge_sum / (TEXTURE_WINDOW * TEXTURE_WINDOW) as f64;

            if uniform && edge_avg < LOW_EDGE_FRACTION {
                let gray = map.legend[level as usize];
                let (first, second) = nearest_palette_pair(gray, palette);
                zones.push(DitheringZone {
                    region: Region {
                        x: window_x as u32,
                        y: window_y as u32,
                        width: TEXTURE_WINDOW as u32,
                        height: TEXTURE_WINDOW as u32,
                    },
                    kind: ZoneKind::Texture,
                    colors: [first, second],
                    pattern: "checker".to_string(),
                    reason: "uniform brightness with low edge activity".to_string(),
                });
            }
            window_x += TEXTURE_WINDOW;
        }
        window_y += TEXTURE_WINDOW;
    }
}

/// Two adjacent brightness levels around `level`, clamped to the legend.
fn adjacent_levels(level: u8, levels: usize) -> (usize, usize) {
    let level = level as usize;
    if level + 1 < levels {
        (level, level + 1)
    } else if level > 0 {
        (level - 1, level)
    } else {
        (0, 0)
    }
}

fn gray_hex(gray: u8) -> String {
    format_hex(Rgba([gray, gray, gray, 255]))
}

/// The two palette entries nearest to a gray value, in palette order on ties.
fn nearest_palette_pair(gray: u8, palette: &[PaletteColor]) -> (String, String) {
    let target = Rgba([gray, gray, gray, 255]);
    let mut ranked: Vec<(u32, usize)> = palette
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let color = parse_color(&entry.hex).unwrap_or(Rgba([0, 0, 0, 255]));
            (distance_sq(target, color), i)
        })
        .collect();
    ranked.sort();
    (palette[ranked[0].1].hex.clone(), palette[ranked[1].1].hex.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(grid: Vec<Vec<u8>>, levels: u8) -> BrightnessMap {
        let legend =
            (0..levels).map(|i| ((2 * u16::from(i) + 1) * 128 / u16::from(levels)) as u8).collect();
        BrightnessMap { grid, legend }
    }

    fn no_edges(width: usize, height: usize) -> Vec<Vec<f64>> {
        vec![vec![0.0; width]; height]
    }

    fn sample_palette() -> Vec<PaletteColor> {
        vec![
            PaletteColor::from_rgba(Rgba([20, 20, 20, 255]), 50.0),
            PaletteColor::from_rgba(Rgba([180, 180, 180, 255]), 30.0),
            PaletteColor::from_rgba(Rgba([255, 0, 0, 255]), 20.0),
        ]
    }

    #[test]
    fn test_gradient_run_detected() {
        let m = map(vec![vec![0, 1, 2, 3, 3, 3]], 4);
        let zones = dithering_zones(&m, &no_edges(6, 1), &[]);
        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.kind, ZoneKind::Gradient);
        // The run keeps its trailing plateau
        assert_eq!(zone.region, Region { x: 0, y: 0, width: 6, height: 1 });
        assert_eq!(zone.pattern, "bayer4x4");
        assert_ne!(zone.colors[0], zone.colors[1]);
    }

    #[test]
    fn test_run_must_rise_overall() {
        // Rises then falls back: two runs, only the rising one qualifies
        let m = map(vec![vec![0, 1, 2, 2, 1, 0]], 4);
        let zones = dithering_zones(&m, &no_edges(6, 1), &[]);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].region, Region { x: 0, y: 0, width: 4, height: 1 });
    }

    #[test]
    fn test_short_runs_ignored() {
        let m = map(vec![vec![0, 1, 0, 1, 0, 1]], 4);
        let zones = dithering_zones(&m, &no_edges(6, 1), &[]);
        assert!(zones.is_empty());
    }

    #[test]
    fn test_flat_row_is_not_a_gradient() {
        let m = map(vec![vec![2, 2, 2, 2, 2, 2]], 4);
        let zones = dithering_zones(&m, &no_edges(6, 1), &[]);
        assert!(zones.is_empty());
    }

    #[test]
    fn test_texture_zone_on_uniform_quiet_window() {
        let m = map(vec![vec![1; 3]; 3], 4);
        let zones = dithering_zones(&m, &no_edges(3, 3), &sample_palette());
        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.kind, ZoneKind::Texture);
        assert_eq!(zone.pattern, "checker");
        // Level 1 of 4 is gray 96: the two grays beat the saturated red
        assert_eq!(zone.colors[0], "#141414");
        assert_eq!(zone.colors[1], "#B4B4B4");
    }

    #[test]
    fn test_busy_window_is_not_texture() {
        let m = map(vec![vec![1; 3]; 3], 4);
        let busy = vec![vec![0.5; 3]; 3];
        let zones = dithering_zones(&m, &busy, &sample_palette());
        assert!(zones.is_empty());
    }

    #[test]
    fn test_texture_needs_palette() {
        let m = map(vec![vec![1; 3]; 3], 4);
        assert!(dithering_zones(&m, &no_edges(3, 3), &[]).is_empty());
    }

    #[test]
    fn test_zone_cap_at_five() {
        // Eight rows, each a clean 5-cell gradient
        let m = map(vec![vec![0, 1, 2, 3, 4]; 8], 5);
        let zones = dithering_zones(&m, &no_edges(5, 8), &sample_palette());
        assert_eq!(zones.len(), MAX_ZONES);
        // Earliest rows win
        assert!(zones.iter().all(|z| z.kind == ZoneKind::Gradient));
        assert_eq!(zones[0].region.y, 0);
        assert_eq!(zones[4].region.y, 4);
    }

    #[test]
    fn test_gradient_takes_priority_over_texture_on_cap() {
        // Five gradient rows above a quiet uniform block: the cap fills with
        // the earlier gradient findings
        let mut grid = vec![vec![0, 1, 2, 3, 4]; 5];
        grid.extend(vec![vec![2; 5]; 3]);
        let m = map(grid, 5);
        let zones = dithering_zones(&m, &no_edges(5, 8), &sample_palette());
        assert_eq!(zones.len(), MAX_ZONES);
        assert!(zones.iter().all(|z| z.kind == ZoneKind::Gradient));
    }
}
