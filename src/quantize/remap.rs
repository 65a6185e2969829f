//! Remapping pixels onto a finished palette.
//!
//! The plain path snaps every non-transparent pixel to its nearest palette
//! entry. The dithered path runs Floyd-Steinberg error diffusion, spreading
//! each pixel's per-channel quantization error to its unvisited neighbors at
//! the standard 7/16, 3/16, 5/16, 1/16 weights. Error is clamped into channel
//! range, never wrapped.

use image::{Rgba, RgbaImage};

use crate::color::nearest_in_palette;

/// Floyd-Steinberg weights: (dx, dy, numerator/16).
const FS_KERNEL: [(i64, i64, f64); 4] =
    [(1, 0, 7.0 / 16.0), (-1, 1, 3.0 / 16.0), (0, 1, 5.0 / 16.0), (1, 1, 1.0 / 16.0)];

/// Map every non-transparent pixel to its nearest palette entry.
///
/// Transparent pixels (`alpha == 0`) pass through untouched; other pixels
/// take the palette entry's RGB and keep their own alpha. An empty palette
/// returns the image unchanged.
pub fn remap_to_palette(image: &RgbaImage, palette: &[Rgba<u8>], dither: bool) -> RgbaImage {
    if palette.is_empty() {
        return image.clone();
    }
    if dither {
        remap_dithered(image, palette)
    } else {
        let mut out = image.clone();
        for pixel in out.pixels_mut() {
            if pixel.0[3] == 0 {
                continue;
            }
            let nearest = nearest_in_palette(*pixel, palette);
            *pixel = Rgba([nearest.0[0], nearest.0[1], nearest.0[2], pixel.0[3]]);
        }
        out
    }
}

fn remap_dithered(image: &RgbaImage, palette: &[Rgba<u8>]) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    let mut errors = vec![[0f64; 3]; (width as usize) * (height as usize)];
    let idx = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;

    for y in 0..height {
        for x in 0..width {
            let source = *image.get_pixel(x, y);
            if source.0[3] == 0 {
                // Transparent pixels absorb nothing and emit nothing
                continue;
            }

            let carried = errors[idx(x, y)];
            let adjusted = [
                (f64::from(source.0[0]) + carried[0]).clamp(0.0, 255.0),
                (f64::from(source.0[1]) + carried[1]).clamp(0.0, 255.0),
                (f64::from(source.0[2]) + carried[2]).clamp(0.0, 255.0),
            ];
            let adjusted_color = Rgba([
                adjusted[0].round() as u8,
                adjusted[1].round() as u8,
                adjusted[2].round() as u8,
                255,
            ]);
            let chosen = nearest_in_palette(adjusted_color, palette);
            out.put_pixel(x, y, Rgba([chosen.0[0], chosen.0[1], chosen.0[2], source.0[3]]));

            for ch in 0..3 {
                let quant_error = adjusted[ch] - f64::from(chosen.0[ch]);
                for &(dx, dy, weight) in &FS_KERNEL {
                    let nx = i64::from(x) + dx;
                    let ny = i64::from(y) + dy;
                    if nx < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                        continue;
                    }
                    errors[idx(nx as u32, ny as u32)][ch] += quant_error * weight;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_palette_returns_input() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));
        let out = remap_to_palette(&img, &[], false);
        assert_eq!(out, img);
    }

    #[test]
    fn test_plain_remap_snaps_every_opaque_pixel() {
        let palette = vec![Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255])];
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([10, 10, 10, 255]));
        img.put_pixel(1, 0, Rgba([240, 240, 240, 255]));
        img.put_pixel(0, 1, Rgba([100, 100, 100, 128]));
        img.put_pixel(1, 1, Rgba([0, 0, 0, 0]));

        let out = remap_to_palette(&img, &palette, false);
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([255, 255, 255, 255]));
        // Alpha survives the snap
        assert_eq!(*out.get_pixel(0, 1), Rgba([0, 0, 0, 128]));
        // Transparent untouched
        assert_eq!(*out.get_pixel(1, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_dithered_remap_stays_in_palette() {
        let palette = vec![Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255])];
        let img = RgbaImage::from_pixel(8, 8, Rgba([128, 128, 128, 255]));
        let out = remap_to_palette(&img, &palette, true);
        for pixel in out.pixels() {
            assert!(
                pixel.0 == [0, 0, 0, 255] || pixel.0 == [255, 255, 255, 255],
                "pixel {pixel:?} escaped the palette"
            );
        }
    }

    #[test]
    fn test_dithered_midtone_uses_both_colors() {
        let palette = vec![Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255])];
        let img = RgbaImage::from_pixel(8, 8, Rgba([128, 128, 128, 255]));
        let out = remap_to_palette(&img, &palette, true);
        let whites = out.pixels().filter(|p| p.0[0] == 255).count();
        let blacks = out.pixels().filter(|p| p.0[0] == 0).count();
        assert!(whites > 0 && blacks > 0, "mid gray should dither to a mix");
        // Roughly half each
        assert!(whites >= 16 && blacks >= 16, "whites={whites} blacks={blacks}");
    }

    #[test]
    fn test_dither_skips_transparent_pixels() {
        let palette = vec![Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255])];
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([128, 128, 128, 255]));
        img.put_pixel(2, 2, Rgba([77, 66, 55, 0]));
        let out = remap_to_palette(&img, &palette, true);
        assert_eq!(*out.get_pixel(2, 2), Rgba([77, 66, 55, 0]));
    }
}
