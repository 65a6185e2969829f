//! Built-in palette definitions.
//!
//! A small set of commonly used pixel art palettes, exposed as ordered RGBA
//! color lists for use with `remap_to_palette` and `nearest_in_palette`.

use image::Rgba;

/// List of all available built-in palette names.
const BUILTIN_NAMES: &[&str] = &["gameboy", "nes", "pico8", "grayscale", "1bit"];

/// Returns a list of all available built-in palette names.
pub fn list_builtins() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

/// Returns a built-in palette by name, or None if not found.
pub fn get_builtin(name: &str) -> Option<Vec<Rgba<u8>>> {
    match name {
        "gameboy" => Some(gameboy()),
        "nes" => Some(nes()),
        "pico8" => Some(pico8()),
        "grayscale" => Some(grayscale()),
        "1bit" => Some(one_bit()),
        _ => None,
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Game Boy 4-color green palette, darkest to lightest.
/// Reference: https://lospec.com/palette-list/nintendo-gameboy-bgb
fn gameboy() -> Vec<Rgba<u8>> {
    vec![rgb(0x0F, 0x38, 0x0F), rgb(0x30, 0x62, 0x30), rgb(0x8B, 0xAC, 0x0F), rgb(0x9B, 0xBC, 0x0F)]
}

/// NES-inspired palette with key representative colors.
/// Reference: https://lospec.com/palette-list/nintendo-entertainment-system
fn nes() -> Vec<Rgba<u8>> {
    vec![
        rgb(0x00, 0x00, 0x00),
        rgb(0xFC, 0xFC, 0xFC),
        rgb(0xA8, 0x00, 0x20),
        rgb(0x00, 0xA8, 0x00),
        rgb(0x00, 0x58, 0xF8),
        rgb(0x00, 0xB8, 0xD8),
        rgb(0xF8, 0xD8, 0x00),
        rgb(0xF8, 0x38, 0x00),
        rgb(0xF8, 0x78, 0xF8),
        rgb(0x50, 0x30, 0x00),
        rgb(0x7C, 0x7C, 0x7C),
        rgb(0xFC, 0xB8, 0xB8),
    ]
}

/// PICO-8 16-color palette.
/// Reference: https://lospec.com/palette-list/pico-8
fn pico8() -> Vec<Rgba<u8>> {
    vec![
        rgb(0x00, 0x00, 0x00),
        rgb(0x1D, 0x2B, 0x53),
        rgb(0x7E, 0x25, 0x53),
        rgb(0x00, 0x87, 0x51),
        rgb(0xAB, 0x52, 0x36),
        rgb(0x5F, 0x57, 0x4F),
        rgb(0xC2, 0xC3, 0xC7),
        rgb(0xFF, 0xF1, 0xE8),
        rgb(0xFF, 0x00, 0x4D),
        rgb(0xFF, 0xA3, 0x00),
        rgb(0xFF, 0xEC, 0x27),
        rgb(0x00, 0xE4, 0x36),
        rgb(0x29, 0xAD, 0xFF),
        rgb(0x83, 0x76, 0x9C),
        rgb(0xFF, 0x77, 0xA8),
        rgb(0xFF, 0xCC, 0xAA),
    ]
}

/// 8-shade grayscale palette from white to black.
fn grayscale() -> Vec<Rgba<u8>> {
    vec![
        rgb(0xFF, 0xFF, 0xFF),
        rgb(0xDF, 0xDF, 0xDF),
        rgb(0xBF, 0xBF, 0xBF),
        rgb(0x9F, 0x9F, 0x9F),
        rgb(0x7F, 0x7F, 0x7F),
        rgb(0x5F, 0x5F, 0x5F),
        rgb(0x3F, 0x3F, 0x3F),
        rgb(0x00, 0x00, 0x00),
    ]
}

/// 1-bit black and white palette.
fn one_bit() -> Vec<Rgba<u8>> {
    vec![rgb(0x00, 0x00, 0x00), rgb(0xFF, 0xFF, 0xFF)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::nearest_in_palette;

    #[test]
    fn test_list_builtins() {
        let builtins = list_builtins();
        assert_eq!(builtins, vec!["gameboy", "nes", "pico8", "grayscale", "1bit"]);
    }

    #[test]
    fn test_builtin_sizes() {
        assert_eq!(get_builtin("gameboy").unwrap().len(), 4);
        assert_eq!(get_builtin("nes").unwrap().len(), 12);
        assert_eq!(get_builtin("pico8").unwrap().len(), 16);
        assert_eq!(get_builtin("grayscale").unwrap().len(), 8);
        assert_eq!(get_builtin("1bit").unwrap().len(), 2);
    }

    #[test]
    fn test_get_builtin_nonexistent() {
        assert!(get_builtin("nonexistent").is_none());
        assert!(get_builtin("").is_none());
        assert!(get_builtin("Gameboy").is_none()); // case-sensitive
    }

    #[test]
    fn test_all_builtins_are_opaque() {
        for name in list_builtins() {
            let palette = get_builtin(name).expect("all listed builtins should exist");
            assert!(palette.iter().all(|c| c.0[3] == 255), "palette {name}");
        }
    }

    #[test]
    fn test_builtins_snap_colors() {
        let gb = get_builtin("gameboy").unwrap();
        // Near-black snaps to the darkest green
        assert_eq!(nearest_in_palette(Rgba([10, 30, 10, 255]), &gb), gb[0]);
    }
}
