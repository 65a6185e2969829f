//! Brightness-map extraction.
//!
//! Converts the source to Rec. 601 luminance, downsamples by area averaging
//! to the requested grid size, and quantizes each cell into equal-width bins
//! over `[0, 255]`. The legend maps each bin back to its midpoint gray.

use image::RgbaImage;

use crate::color::luminance;
use crate::models::BrightnessMap;

/// Build the quantized brightness grid for a reference image.
///
/// An empty source produces an empty grid; the legend is always populated so
/// callers can still label levels.
pub fn brightness_map(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
    levels: u8,
) -> BrightnessMap {
    let legend = legend(levels);
    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 {
        return BrightnessMap { grid: Vec::new(), legend };
    }

    let mut grid = Vec::with_capacity(target_height as usize);
    for cell_y in 0..target_height {
        let mut row = Vec::with_capacity(target_width as usize);
        for cell_x in 0..target_width {
            // Source window covered by this cell, at least one pixel wide
            let x0 = cell_x * src_w / target_width;
            let x1 = (((cell_x + 1) * src_w).div_ceil(target_width)).min(src_w).max(x0 + 1);
            let y0 = cell_y * src_h / target_height;
            let y1 = (((cell_y + 1) * src_h).div_ceil(target_height)).min(src_h).max(y0 + 1);

            let mut sum = 0.0;
            let mut count = 0u32;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += luminance(*image.get_pixel(x, y));
                    count += 1;
                }
            }
            let average = sum / f64::from(count);
            row.push(quantize_level(average, levels));
        }
        grid.push(row);
    }
    BrightnessMap { grid, legend }
}

/// Bin index for a luminance value, equal-width bins over `[0, 255]`.
fn quantize_level(value: f64, levels: u8) -> u8 {
    let level = (value * f64::from(levels) / 256.0).floor();
    (level as u8).min(levels - 1)
}

/// Midpoint gray for each bin.
fn legend(levels: u8) -> Vec<u8> {
    (0..levels)
        .map(|i| {
            let midpoint = (2.0 * f64::from(i) + 1.0) * 128.0 / f64::from(levels);
            midpoint.round().min(255.0) as u8
        })
        .collect()
}
