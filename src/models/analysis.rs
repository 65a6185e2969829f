//! Result types for reference-image analysis.

use serde::{Deserialize, Serialize};

use super::palette::PaletteColor;
use super::region::Region;

/// Downsampled, level-quantized brightness of a reference image.
///
/// `grid[y][x]` is a level in `[0, levels)`; `legend[level]` is the
/// representative gray value (bin midpoint) for that level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightnessMap {
    pub grid: Vec<Vec<u8>>,
    pub legend: Vec<u8>,
}

impl BrightnessMap {
    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.grid.len()
    }
}

/// A contour of edge pixels reported end-to-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSegment {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    /// How many edge pixels the contour contains
    pub pixels: usize,
}

/// Edge detection output at source resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMap {
    /// `grid[y][x]` is true where gradient magnitude exceeds the threshold
    pub grid: Vec<Vec<bool>>,
    /// Contours of at least the minimum traced length
    pub major_edges: Vec<EdgeSegment>,
}

/// Rule-of-thirds guide lines in source coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOfThirds {
    pub horizontal_lines: [u32; 2],
    pub vertical_lines: [u32; 2],
}

/// A local maximum of edge density, ranked by strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub x: u32,
    pub y: u32,
    /// Normalized edge density, `[0, 1]`
    pub strength: f64,
}

/// Composition guides extracted from the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub rule_of_thirds: RuleOfThirds,
    pub focal_points: Vec<FocalPoint>,
}

/// What kind of dithering a suggested zone calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Brightness ramps monotonically; blend two adjacent levels
    Gradient,
    /// Flat brightness with little edge activity; break it up with texture
    Texture,
}

/// A region of the brightness grid where dithering would help.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DitheringZone {
    /// Zone bounds in brightness-grid cells
    pub region: Region,
    pub kind: ZoneKind,
    /// The two colors to dither between, as hex
    pub colors: [String; 2],
    /// Suggested pattern name, e.g. "bayer4x4"
    pub pattern: String,
    /// Human-readable justification
    pub reason: String,
}

/// Overall hue relationship of the extracted palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorHarmony {
    Complementary,
    Analogous,
    Triadic,
    Diverse,
}

impl std::fmt::Display for ColorHarmony {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorHarmony::Complementary => write!(f, "complementary"),
            ColorHarmony::Analogous => write!(f, "analogous"),
            ColorHarmony::Triadic => write!(f, "triadic"),
            ColorHarmony::Diverse => write!(f, "diverse"),
        }
    }
}

/// Lightness spread between the darkest and lightest palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContrastBand {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ContrastBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContrastBand::Low => write!(f, "low"),
            ContrastBand::Medium => write!(f, "medium"),
            ContrastBand::High => write!(f, "high"),
        }
    }
}

/// Scalar summary of the reference image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// `target_width / source_width`
    pub scale_factor: f64,
    /// Usage-weighted circular mean of palette hues, degrees
    pub dominant_hue: f64,
    pub color_harmony: ColorHarmony,
    pub contrast_ratio: ContrastBand,
}

/// Everything the analyzer extracts from one reference image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAnalysis {
    pub palette: Vec<PaletteColor>,
    pub brightness: BrightnessMap,
    pub edges: EdgeMap,
    pub composition: Composition,
    pub dithering_zones: Vec<DitheringZone>,
    pub metadata: AnalysisMetadata,
}
