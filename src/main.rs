//! Pixelops - command-line entry point for the raster engine

use std::process::ExitCode;

use pixelops::cli;

fn main() -> ExitCode {
    cli::run()
}
