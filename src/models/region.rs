//! Rectangular regions and positioned pixels.

use image::Rgba;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Error constructing a [`Region`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Width or height was zero
    #[error("region extent must be at least 1x1, got {width}x{height}")]
    EmptyExtent { width: u32, height: u32 },
}

/// An axis-aligned rectangle in image coordinates.
///
/// Coordinates are non-negative and the extent is at least 1x1, enforced at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a region, rejecting zero-extent rectangles.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self, RegionError> {
        if width == 0 || height == 0 {
            return Err(RegionError::EmptyExtent { width, height });
        }
        Ok(Self { x, y, width, height })
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether `(x, y)` falls inside this region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A single positioned pixel, the unit the editor bridge writes back.
///
/// Serializes the color as a hex string so pixel buffers can go straight to
/// the tool layer as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    #[serde(serialize_with = "serialize_hex")]
    pub color: Rgba<u8>,
}

impl Pixel {
    pub fn new(x: u32, y: u32, color: Rgba<u8>) -> Self {
        Self { x, y, color }
    }
}

fn serialize_hex<S: Serializer>(color: &Rgba<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&crate::color::format_hex(*color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_rejects_zero_extent() {
        assert!(Region::new(0, 0, 0, 5).is_err());
        assert!(Region::new(0, 0, 5, 0).is_err());
        assert!(Region::new(0, 0, 1, 1).is_ok());
    }

    #[test]
    fn test_region_contains() {
        let r = Region::new(2, 3, 4, 2).unwrap();
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 4));
        assert!(!r.contains(6, 3));
        assert!(!r.contains(2, 5));
        assert!(!r.contains(0, 0));
    }

    #[test]
    fn test_region_area() {
        assert_eq!(Region::new(0, 0, 10, 4).unwrap().area(), 40);
    }

    #[test]
    fn test_pixel_serializes_color_as_hex() {
        let p = Pixel::new(1, 2, Rgba([255, 0, 0, 255]));
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r##"{"x":1,"y":2,"color":"#FF0000"}"##);
    }
}
