//! Common helpers shared across the splitter crates.

/// Persistent settings (normalization policy, output encoding, telemetry).
pub mod config;
/// Test fixture loading and path resolution.
pub mod fixtures;
/// Image loading and decoding.
pub mod image_utils;
/// Crop encoding and file output.
pub mod output;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use config::{AppSettings, NormalizeSettings, OutputSettings, TelemetrySettings};
pub use fixtures::{fixture_path, fixtures_dir, load_fixture_json, load_fixture_text};
pub use image_utils::{decode_image_bytes, ensure_has_pixels, load_image};
pub use output::{ImageFormatHint, OutputOptions, encode_image, write_bytes};
pub use telemetry::{
    TimingGuard, configure as configure_telemetry, telemetry_allows, telemetry_enabled,
    telemetry_level, timing_guard, timing_guard_if,
};

/// Initialize logging once for CLI and library consumers.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` is used. Calling this more than
/// once is harmless.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(telemetry::TELEMETRY_TARGET, LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
