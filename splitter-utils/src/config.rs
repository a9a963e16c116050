//! Persistent settings shared by the splitter front ends.
//!
//! Every section uses `#[serde(default)]` so partially written JSON files keep working when
//! new fields are added.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::output::ImageFormatHint;

/// Parameters of the region normalization policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalizeSettings {
    /// Smallest accepted width/height of a region as a fraction of the image extent.
    pub min_dimension_fraction: f64,
    /// Divisor applied to boxes reported on the large coordinate scale.
    pub scale_divisor: f64,
    /// Label of the region substituted when nothing survives validation.
    pub fallback_label: String,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            min_dimension_fraction: 0.02,
            scale_divisor: 1000.0,
            fallback_label: "full image".to_string(),
        }
    }
}

impl NormalizeSettings {
    /// Clamp values to ranges the normalizer can work with.
    pub fn sanitize(&mut self) {
        if !self.min_dimension_fraction.is_finite() {
            self.min_dimension_fraction = Self::default().min_dimension_fraction;
        }
        self.min_dimension_fraction = self.min_dimension_fraction.clamp(f64::EPSILON, 1.0);
        if !self.scale_divisor.is_finite() || self.scale_divisor <= 1.0 {
            self.scale_divisor = Self::default().scale_divisor;
        }
        if self.fallback_label.trim().is_empty() {
            self.fallback_label = Self::default().fallback_label;
        }
    }
}

/// Encoding options for crop assets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Output format: "jpeg" (default), "png" or "webp".
    pub format: String,
    /// JPEG quality (1-100). `None` keeps the encoder's default.
    pub jpeg_quality: Option<u8>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: "jpeg".to_string(),
            jpeg_quality: None,
        }
    }
}

impl OutputSettings {
    /// Parsed output format, falling back to JPEG for unknown names.
    pub fn format_hint(&self) -> ImageFormatHint {
        self.format.parse().unwrap_or(ImageFormatHint::Jpeg)
    }
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether telemetry timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Debug,
        }
    }
}

/// Settings consumed by the CLI and any other front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub normalize: NormalizeSettings,
    pub output: OutputSettings,
    pub telemetry: TelemetrySettings,
}

impl AppSettings {
    /// Load settings from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        settings.normalize.sanitize();
        Ok(settings)
    }

    /// Serialize settings to disk as pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }
}

/// Default location of persisted settings (`config/splitter_settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/splitter_settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/splitter_settings.json"))
}
