//! `facecrop` command-line entry point.

mod args;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use facecrop::{DetectorSettings, FaceCropper, FaceLocator, RustfaceLocator};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::args::CropArgs;

const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;

fn main() -> Result<ExitCode> {
    let args = CropArgs::parse();

    let filter = EnvFilter::try_new(&args.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let locator = load_locator(&args)?;
    let status = run(&args, &locator, &mut io::stdout().lock())?;
    Ok(ExitCode::from(status))
}

fn load_locator(args: &CropArgs) -> Result<RustfaceLocator> {
    let settings = DetectorSettings {
        min_face_size: args.min_face_size,
        ..DetectorSettings::default()
    };
    let locator = RustfaceLocator::from_path(&args.model, settings)
        .with_context(|| format!("loading face model from {}", args.model.display()))?;
    debug!(settings = ?locator.settings(), "face locator ready");
    Ok(locator)
}

/// Crop `args.input` into `args.output` and write the status line to `out`.
///
/// Returns the process exit status.
fn run(args: &CropArgs, locator: &dyn FaceLocator, out: &mut impl Write) -> io::Result<u8> {
    let result = FaceCropper::new(locator)
        .margin(args.margin)
        .crop_file(&args.input, &args.output);

    match result {
        Ok(_) => {
            writeln!(out, "Imagem salva em: {}", args.output.display())?;
            Ok(EXIT_OK)
        }
        Err(e) => {
            error!(input = %args.input.display(), "{e}");
            writeln!(out, "{}", e.reason())?;
            Ok(EXIT_FAILED)
        }
    }
}
