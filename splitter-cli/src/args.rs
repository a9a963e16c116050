//! Command-line argument definitions for the splitter binary.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Split a composite image into one crop per detected region.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct SplitArgs {
    /// Composite image to split (jpg, png, webp, bmp).
    #[arg(short, long)]
    pub input: PathBuf,

    /// File holding the detection model's response (raw text or JSON, optionally fenced).
    #[arg(short, long)]
    pub detections: PathBuf,

    /// Directory that receives the exported crops.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Optional settings JSON. Defaults to `config/splitter_settings.json` when present, otherwise built-in parameters.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the crop manifest to a JSON file instead of stdout.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Directory to write a copy of the input with the validated regions outlined.
    #[arg(long)]
    pub annotate: Option<PathBuf>,

    /// JPEG quality (1-100) for exported crops. Defaults to the encoder's own default.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    /// Smallest accepted region width/height as a fraction of the image (default 0.02).
    #[arg(long, value_name = "FRACTION")]
    pub min_dimension: Option<f64>,

    /// Write the effective settings (file plus flag overrides) to this JSON path.
    #[arg(long, value_name = "PATH")]
    pub save_config: Option<PathBuf>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,
}
