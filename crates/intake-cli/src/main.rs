//! intake: offline front end for the intake form's raster processing.
//!
//! - `crop`: trim the padding from a logo, as the page header does.
//! - `normalize`: place an image on a signature surface the way an
//!   upload would (scale down, center, flatten onto white).
//! - `render`: replay recorded strokes onto a blank signature surface.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin intake -- crop logo.png -o logo-cropped.png --json
//! cargo run --bin intake -- normalize scan.jpg -o signature.png
//! cargo run --bin intake -- render strokes.json -o signature.png
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use intake_imaging::{
    ManualClock, Point, SignatureConfig, SignatureSurface, SkiaCanvas, UploadedFile,
    auto_crop_encoded,
};
use tracing_subscriber::EnvFilter;

/// Logo cropping and signature normalization for the intake form.
#[derive(Parser)]
#[command(name = "intake", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trim transparent or background-coloured margins from an image.
    Crop {
        /// Input image path (PNG, JPEG, BMP, WebP, GIF).
        input: PathBuf,

        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,

        /// Print the crop box as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Fit an image onto a signature surface as an upload would.
    Normalize {
        /// Input image path.
        input: PathBuf,

        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        surface: SurfaceArgs,
    },

    /// Draw recorded strokes onto a blank signature surface.
    ///
    /// The input is a JSON array of strokes, each an array of
    /// `{"x": .., "y": ..}` points in surface pixels.
    Render {
        /// Strokes JSON path.
        strokes: PathBuf,

        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        surface: SurfaceArgs,
    },
}

#[derive(Args)]
struct SurfaceArgs {
    /// Surface width in pixels.
    #[arg(long, default_value_t = SignatureConfig::DEFAULT_WIDTH)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = SignatureConfig::DEFAULT_HEIGHT)]
    height: u32,

    /// Full surface config as a JSON string.
    ///
    /// When provided, `--width` and `--height` are ignored. Missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

impl SurfaceArgs {
    fn config(&self) -> Result<SignatureConfig, String> {
        let config = match &self.config_json {
            Some(json) => serde_json::from_str::<SignatureConfig>(json)
                .map_err(|e| format!("invalid --config-json: {e}"))?,
            None => SignatureConfig {
                width: self.width,
                height: self.height,
                ..SignatureConfig::default()
            },
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Crop {
            input,
            output,
            json,
        } => crop(input, output, *json),
        Command::Normalize {
            input,
            output,
            surface,
        } => normalize(input, output, surface),
        Command::Render {
            strokes,
            output,
            surface,
        } => render(strokes, output, surface),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("reading {}: {e}", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), String> {
    std::fs::write(path, bytes).map_err(|e| format!("writing {}: {e}", path.display()))?;
    eprintln!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn crop(input: &Path, output: &Path, json: bool) -> CliResult {
    let bytes = read(input)?;
    eprintln!("Image: {} ({} bytes)", input.display(), bytes.len());

    let (encoded, found) = auto_crop_encoded(&bytes)?;
    let b = found.bounds;
    eprintln!(
        "Crop: {:?} -> left {}, top {}, right {}, bottom {} ({}x{})",
        found.method,
        b.left,
        b.top,
        b.right,
        b.bottom,
        b.width(),
        b.height()
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    }
    write(output, encoded.as_bytes())?;
    Ok(())
}

/// A surface whose emissions are discarded; the CLI reads results
/// from the operation return values instead.
fn blank_surface(
    args: &SurfaceArgs,
) -> Result<SignatureSurface<SkiaCanvas, ManualClock>, Box<dyn std::error::Error>> {
    let config = args.config()?;
    let canvas = SkiaCanvas::new(config.dimensions())?;
    Ok(SignatureSurface::new(canvas, ManualClock::new(), config, |_| {})?)
}

fn normalize(input: &Path, output: &Path, args: &SurfaceArgs) -> CliResult {
    let bytes = read(input)?;
    let mime_type = image::ImageFormat::from_path(input)
        .map_or("application/octet-stream", |format| format.to_mime_type());
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    eprintln!("Image: {} ({mime_type}, {} bytes)", input.display(), bytes.len());

    let mut surface = blank_surface(args)?;
    let encoded = surface.upload_image(&UploadedFile::new(name, mime_type, bytes))?;
    let dims = surface.dimensions();
    tracing::info!(width = dims.width, height = dims.height, "normalized onto surface");
    write(output, encoded.as_bytes())?;
    Ok(())
}

fn render(strokes_path: &Path, output: &Path, args: &SurfaceArgs) -> CliResult {
    let json = read(strokes_path)?;
    let strokes: Vec<Vec<Point>> = serde_json::from_slice(&json)
        .map_err(|e| format!("parsing {}: {e}", strokes_path.display()))?;
    let points: usize = strokes.iter().map(Vec::len).sum();
    eprintln!("Strokes: {} ({points} points)", strokes.len());

    let mut surface = blank_surface(args)?;
    for stroke in &strokes {
        let Some((first, rest)) = stroke.split_first() else {
            continue;
        };
        surface.begin_stroke(*first);
        for point in rest {
            surface.extend_stroke(*point)?;
        }
        surface.end_stroke();
    }

    let encoded = surface.save()?;
    write(output, encoded.as_bytes())?;
    Ok(())
}
