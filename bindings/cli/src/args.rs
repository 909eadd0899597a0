//! Command-line argument definitions for the `facecrop` binary.

use std::path::PathBuf;

use clap::Parser;
use facecrop::DEFAULT_MARGIN_RATIO;

/// Crop the first frontal face in an image and save it with a margin.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct CropArgs {
    /// Image to read (JPEG, PNG, WebP, BMP or GIF).
    pub input: PathBuf,

    /// Where to write the crop; the extension picks the output format.
    pub output: PathBuf,

    /// Extra border around the face, as a fraction of its width and height.
    #[arg(short, long, default_value_t = DEFAULT_MARGIN_RATIO, value_parser = parse_margin)]
    pub margin: f64,

    /// Path to the SeetaFace frontal face model.
    #[arg(
        long,
        env = "FACECROP_MODEL",
        default_value = "model/seeta_fd_frontal_v1.0.bin"
    )]
    pub model: PathBuf,

    /// Smallest face edge, in pixels, that will be detected.
    #[arg(long, default_value_t = 20)]
    pub min_face_size: u32,

    /// Log level filter (error, warn, info, debug, trace).
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

fn parse_margin(value: &str) -> Result<f64, String> {
    let margin: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !margin.is_finite() || margin < 0.0 {
        return Err(format!("margin must be a non-negative number, got {value}"));
    }
    Ok(margin)
}
