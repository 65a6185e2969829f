//! Pixelops - raster color engine for AI-driven pixel art
//!
//! This library provides the image-processing core behind agent-driven pixel
//! art tooling, operating purely on in-memory RGBA buffers:
//! - Palette quantization (median-cut, k-means, octree) with optional
//!   error-diffusion remapping
//! - Reference-image analysis (palette, brightness map, edges, composition,
//!   dithering zones)
//! - Two-color dither fills (Bayer matrices, textures, Floyd-Steinberg)
//! - Diagonal-edge antialiasing suggestions
//! - Directional auto-shading
//!
//! Every entry point is a pure function over an owned buffer; editor
//! integration, script generation and file I/O live with the caller.

pub mod analyze;
pub mod antialias;
pub mod cli;
pub mod color;
pub mod dither;
pub mod models;
pub mod palettes;
pub mod quantize;
pub mod shade;
