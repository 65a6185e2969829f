//! Edge detection at source resolution.
//!
//! Sobel gradient magnitude over luminance; a pixel is an edge when its
//! magnitude exceeds the caller's threshold. Edge pixels then group into
//! 8-connected contours, and contours of at least [`MIN_CONTOUR_PIXELS`]
//! report as major edges with end-to-end segments.

use image::RgbaImage;

use crate::color::luminance;
use crate::models::{EdgeMap, EdgeSegment};

/// Contours shorter than this stay out of `major_edges`.
pub const MIN_CONTOUR_PIXELS: usize = 5;

const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Detect edges and trace major contours.
pub fn edge_map(image: &RgbaImage, threshold: u8) -> EdgeMap {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return EdgeMap { grid: Vec::new(), major_edges: Vec::new() };
    }

    // Luminance plane with clamp-to-edge sampling at the borders
    let lum: Vec<f64> = image.pixels().map(|p| luminance(*p)).collect();
    let sample = |x: i64, y: i64| -> f64 {
        let x = x.clamp(0, i64::from(width) - 1) as usize;
        let y = y.clamp(0, i64::from(height) - 1) as usize;
        lum[y * width as usize + x]
    };

    let mut grid = vec![vec![false; width as usize]; height as usize];
    for y in 0..height {
        for x in 0..width {
            let mut gx = 0.0;
            let mut gy = 0.0;
            for ky in 0..3 {
                for kx in 0..3 {
                    let value =
                        sample(i64::from(x) + kx as i64 - 1, i64::from(y) + ky as i64 - 1);
                    gx += SOBEL_X[ky][kx] * value;
                    gy += SOBEL_Y[ky][kx] * value;
                }
            }
            let magnitude = (gx * gx + gy * gy).sqrt();
            grid[y as usize][x as usize] = magnitude > f64::from(threshold);
        }
    }

    let major_edges = trace_contours(&grid, width, height);
    EdgeMap { grid, major_edges }
}

/// Group edge pixels into 8-connected contours and report the long ones.
///
/// Each segment runs from the contour's scan-order start to its farthest
/// member, which captures the dominant direction well enough for guides.
fn trace_contours(grid: &[Vec<bool>], width: u32, height: u32) -> Vec<EdgeSegment> {
    let mut visited = vec![vec![false; width as usize]; height as usize];
    let mut segments = Vec::new();

    for start_y in 0..height as usize {
        for start_x in 0..width as usize {
            if !grid[start_y][start_x] || visited[start_y][start_x] {
                continue;
            }

            let mut members = Vec::new();
            let mut stack = vec![(start_x, start_y)];
            visited[start_y][start_x] = true;
            while let Some((x, y)) = stack.pop() {
                members.push((x, y));
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height)
                        {
                            continue;
                        }
                        let (nx, ny) = (nx as usize, ny as usize);
                        if grid[ny][nx] && !visited[ny][nx] {
                            visited[ny][nx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            if members.len() < MIN_CONTOUR_PIXELS {
                continue;
            }
            let (sx, sy) = (start_x, start_y);
            let &(ex, ey) = members
                .iter()
                .max_by_key(|&&(x, y)| {
                    let dx = x as i64 - sx as i64;
                    let dy = y as i64 - sy as i64;
                    dx * dx + dy * dy
                })
                .unwrap_or(&(sx, sy));
            segments.push(EdgeSegment {
                x1: sx as u32,
                y1: sy as u32,
                x2: ex as u32,
                y2: ey as u32,
                pixels: members.len(),
            });
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([120, 130, 140, 255]));
        let map = edge_map(&img, 50);
        assert!(map.grid.iter().flatten().all(|&edge| !edge));
        assert!(map.major_edges.is_empty());
    }

    #[test]
    fn test_vertical_boundary_detected_at_source_resolution() {
        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        for y in 0..10 {
            for x in 5..10 {
                img.put_pixel(x, y, WHITE);
            }
        }
        let map = edge_map(&img, 100);
        assert_eq!(map.grid.len(), 10);
        assert_eq!(map.grid[0].len(), 10);
        // Columns along the boundary light up, the far columns stay dark
        assert!(map.grid[5][4] || map.grid[5][5]);
        assert!(!map.grid[5][0]);
        assert!(!map.grid[5][9]);
        // A 10-pixel-tall boundary is a major contour
        assert!(!map.major_edges.is_empty());
        assert!(map.major_edges[0].pixels >= MIN_CONTOUR_PIXELS);
    }

    #[test]
    fn test_threshold_gates_detection() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([100, 100, 100, 255]));
        for y in 0..8 {
            for x in 4..8 {
                img.put_pixel(x, y, Rgba([120, 120, 120, 255]));
            }
        }
        // A 20-gray step passes a low threshold and fails a high one
        let low = edge_map(&img, 10);
        let high = edge_map(&img, 200);
        assert!(low.grid.iter().flatten().any(|&edge| edge));
        assert!(high.grid.iter().flatten().all(|&edge| !edge));
    }

    #[test]
    fn test_short_contours_are_not_major() {
        // A faint dot: only the 4 orthogonal neighbors clear the threshold
        // (gradient 120) while the diagonals (85) stay under it, leaving a
        // 4-pixel contour that is too short to report
        let mut img = RgbaImage::from_pixel(12, 12, BLACK);
        img.put_pixel(6, 6, Rgba([60, 60, 60, 255]));
        let map = edge_map(&img, 100);
        let edge_count: usize = map.grid.iter().flatten().filter(|&&e| e).count();
        assert_eq!(edge_count, 4);
        assert!(map.major_edges.is_empty());
    }

    #[test]
    fn test_segment_spans_the_contour() {
        let mut img = RgbaImage::from_pixel(16, 8, BLACK);
        for y in 0..8 {
            for x in 8..16 {
                img.put_pixel(x, y, WHITE);
            }
        }
        let map = edge_map(&img, 100);
        let segment = map.major_edges.first().expect("boundary contour");
        let span = segment.y2.abs_diff(segment.y1);
        assert!(span >= 6, "segment should run most of the boundary, spans {span}");
    }

    #[test]
    fn test_empty_image() {
        let map = edge_map(&RgbaImage::new(0, 0), 50);
        assert!(map.grid.is_empty());
        assert!(map.major_edges.is_empty());
    }
}
