//! Command-line interface implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use image::RgbaImage;

use crate::antialias;
use crate::analyze;
use crate::color::parse_color;
use crate::dither::{fill_dither, DitherPattern};
use crate::models::Region;
use crate::quantize::{self, QuantizeAlgorithm};
use crate::shade::{self, LightDirection, ShadeStyle};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Pixelops - quantize, analyze, dither and shade pixel art rasters
#[derive(Parser)]
#[command(name = "pxo")]
#[command(about = "Pixelops - quantize, analyze, dither and shade pixel art rasters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reduce an image to a limited palette
    Quantize {
        /// Input PNG image
        input: PathBuf,

        /// Target palette size (2-256)
        #[arg(short, long, default_value = "16")]
        colors: usize,

        /// Quantization algorithm
        #[arg(short, long, default_value = "median-cut")]
        algorithm: QuantizeAlgorithm,

        /// Cluster transparent pixels like any other color
        #[arg(long)]
        no_transparency: bool,

        /// Also remap the image onto the palette and write it here
        #[arg(long)]
        remap: Option<PathBuf>,

        /// Error-diffusion dither during remap
        #[arg(long)]
        dither: bool,
    },

    /// Analyze a reference image for pixel-art recreation
    Analyze {
        /// Input PNG image
        input: PathBuf,

        /// Target canvas width in pixels
        #[arg(long, default_value = "32")]
        width: u32,

        /// Target canvas height in pixels
        #[arg(long, default_value = "32")]
        height: u32,

        /// Extracted palette size (5-32)
        #[arg(long, default_value = "16")]
        palette_size: usize,

        /// Brightness quantization levels (2-10)
        #[arg(long, default_value = "5")]
        brightness_levels: u8,

        /// Edge detection threshold (0-255)
        #[arg(long, default_value = "50")]
        edge_threshold: u8,
    },

    /// Fill a region with a two-color dither pattern
    Dither {
        /// Output PNG image
        output: PathBuf,

        /// Region width in pixels
        #[arg(long)]
        width: u32,

        /// Region height in pixels
        #[arg(long)]
        height: u32,

        /// First color (emitted below the density threshold)
        #[arg(long, default_value = "#000000")]
        color1: String,

        /// Second color (emitted at densities above the threshold)
        #[arg(long, default_value = "#FFFFFF")]
        color2: String,

        /// Dither pattern
        #[arg(short, long, default_value = "bayer4x4")]
        pattern: DitherPattern,

        /// Share of color2, 0.0-1.0
        #[arg(short, long, default_value = "0.5")]
        density: f64,
    },

    /// Shade an image against a light direction
    Shade {
        /// Input PNG image
        input: PathBuf,

        /// Output PNG image
        output: PathBuf,

        /// Light direction
        #[arg(short, long, default_value = "top-left")]
        light: LightDirection,

        /// Shading intensity, 0.0-1.0
        #[arg(short, long, default_value = "0.5")]
        intensity: f64,

        /// Shading style
        #[arg(short, long, default_value = "cell")]
        style: ShadeStyle,

        /// Cool shadows and warm highlights
        #[arg(long)]
        hue_shift: bool,
    },

    /// Suggest antialiasing pixels for diagonal staircases
    Antialias {
        /// Input PNG image
        input: PathBuf,

        /// Snap suggested colors to colors already in the image
        #[arg(long)]
        use_palette: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Quantize { input, colors, algorithm, no_transparency, remap, dither } => {
            run_quantize(&input, colors, algorithm, !no_transparency, remap.as_deref(), dither)
        }
        Commands::Analyze { input, width, height, palette_size, brightness_levels, edge_threshold } => {
            run_analyze(&input, width, height, palette_size, brightness_levels, edge_threshold)
        }
        Commands::Dither { output, width, height, color1, color2, pattern, density } => {
            run_dither(&output, width, height, &color1, &color2, pattern, density)
        }
        Commands::Shade { input, output, light, intensity, style, hue_shift } => {
            run_shade(&input, &output, light, intensity, style, hue_shift)
        }
        Commands::Antialias { input, use_palette } => run_antialias(&input, use_palette),
    }
}

/// Load a PNG into an RGBA buffer
fn load_image(path: &Path) -> Result<RgbaImage, ExitCode> {
    match image::open(path) {
        Ok(img) => Ok(img.to_rgba8()),
        Err(e) => {
            eprintln!("Error: Cannot open input image '{}': {}", path.display(), e);
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
    }
}

fn save_image(image: &RgbaImage, path: &Path) -> Result<(), ExitCode> {
    image.save(path).map_err(|e| {
        eprintln!("Error: Cannot write image '{}': {}", path.display(), e);
        ExitCode::from(EXIT_ERROR)
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Cannot serialize result: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run_quantize(
    input: &Path,
    colors: usize,
    algorithm: QuantizeAlgorithm,
    preserve_transparency: bool,
    remap: Option<&Path>,
    dither: bool,
) -> ExitCode {
    let img = match load_image(input) {
        Ok(img) => img,
        Err(code) => return code,
    };

    let result = match quantize::quantize(&img, colors, algorithm, preserve_transparency) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    if let Some(remap_path) = remap {
        let palette: Vec<_> =
            result.palette.iter().filter_map(|hex| parse_color(hex).ok()).collect();
        let remapped = quantize::remap_to_palette(&img, &palette, dither);
        if let Err(code) = save_image(&remapped, remap_path) {
            return code;
        }
    }

    print_json(&result)
}

fn run_analyze(
    input: &Path,
    width: u32,
    height: u32,
    palette_size: usize,
    brightness_levels: u8,
    edge_threshold: u8,
) -> ExitCode {
    let img = match load_image(input) {
        Ok(img) => img,
        Err(code) => return code,
    };

    match analyze::analyze(&img, width, height, palette_size, brightness_levels, edge_threshold) {
        Ok(result) => print_json(&result),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_INVALID_ARGS)
        }
    }
}

fn run_dither(
    output: &Path,
    width: u32,
    height: u32,
    color1: &str,
    color2: &str,
    pattern: DitherPattern,
    density: f64,
) -> ExitCode {
    let region = match Region::new(0, 0, width, height) {
        Ok(region) => region,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let (c1, c2) = match (parse_color(color1), parse_color(color2)) {
        (Ok(c1), Ok(c2)) => (c1, c2),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: invalid color: {e}");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let pixels = match fill_dither(region, c1, c2, pattern, density) {
        Ok(pixels) => pixels,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut img = RgbaImage::new(width, height);
    for pixel in &pixels {
        img.put_pixel(pixel.x, pixel.y, pixel.color);
    }
    match save_image(&img, output) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(code) => code,
    }
}

fn run_shade(
    input: &Path,
    output: &Path,
    light: LightDirection,
    intensity: f64,
    style: ShadeStyle,
    hue_shift: bool,
) -> ExitCode {
    let img = match load_image(input) {
        Ok(img) => img,
        Err(code) => return code,
    };

    let result = match shade::shade(&img, light, intensity, style, hue_shift) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    if let Err(code) = save_image(&result.shaded, output) {
        return code;
    }

    #[derive(serde::Serialize)]
    struct ShadeSummary<'a> {
        generated_colors: &'a [String],
        regions_shaded: usize,
    }
    print_json(&ShadeSummary {
        generated_colors: &result.generated_colors,
        regions_shaded: result.regions_shaded,
    })
}

fn run_antialias(input: &Path, use_palette: bool) -> ExitCode {
    let img = match load_image(input) {
        Ok(img) => img,
        Err(code) => return code,
    };
    if img.width() == 0 || img.height() == 0 {
        return print_json(&Vec::<antialias::EdgeSuggestion>::new());
    }

    let region = match Region::new(0, 0, img.width(), img.height()) {
        Ok(region) => region,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let suggestions = antialias::suggest(&img, region, 0.5, use_palette);
    print_json(&suggestions)
}
