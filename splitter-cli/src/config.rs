//! Configuration loading and CLI override logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use splitter_utils::{
    config::{AppSettings, default_settings_path},
    normalize_path,
};

use crate::args::SplitArgs;

/// Load application settings from a file or use defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        Ok(settings)
    } else {
        let default_path = default_settings_path();
        if default_path.exists() {
            let settings = AppSettings::load_from_path(&default_path).with_context(|| {
                format!(
                    "failed to load default settings from {}",
                    default_path.display()
                )
            })?;
            info!("Loaded settings from {}", default_path.display());
            Ok(settings)
        } else {
            Ok(AppSettings::default())
        }
    }
}

/// Apply command-line arguments to override loaded or default settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, args: &SplitArgs) {
    if args.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(level) = args.telemetry_level.as_ref() {
        let normalized = level.trim();
        if !normalized.is_empty() {
            let lower = normalized.to_ascii_lowercase();
            if lower == "off" {
                settings.telemetry.enabled = false;
            }
            settings.telemetry.level = lower;
        }
    }

    if let Some(fraction) = args.min_dimension {
        settings.normalize.min_dimension_fraction = fraction;
    }
    if let Some(quality) = args.jpeg_quality {
        settings.output.jpeg_quality = Some(quality);
    }
    // Exported names always end in `.jpg`.
    settings.output.format = "jpeg".to_string();

    settings.normalize.sanitize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use log::LevelFilter;

    fn parse(extra: &[&str]) -> SplitArgs {
        let mut argv = vec!["splitter", "-i", "page.png", "-d", "response.json"];
        argv.extend_from_slice(extra);
        SplitArgs::parse_from(argv)
    }

    #[test]
    fn flags_override_settings() {
        let mut settings = AppSettings::default();
        settings.output.format = "png".into();
        apply_cli_overrides(
            &mut settings,
            &parse(&[
                "--min-dimension",
                "0.1",
                "--jpeg-quality",
                "80",
                "--telemetry",
                "--telemetry-level",
                "INFO",
            ]),
        );

        assert_eq!(settings.normalize.min_dimension_fraction, 0.1);
        assert_eq!(settings.output.jpeg_quality, Some(80));
        assert_eq!(settings.output.format, "jpeg");
        assert!(settings.telemetry.enabled);
        assert_eq!(settings.telemetry.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn out_of_range_fraction_is_sanitized() {
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &parse(&["--min-dimension", "3"]));
        assert_eq!(settings.normalize.min_dimension_fraction, 1.0);
    }

    #[test]
    fn telemetry_level_off_disables_telemetry() {
        let mut settings = AppSettings::default();
        settings.telemetry.enabled = true;
        apply_cli_overrides(&mut settings, &parse(&["--telemetry-level", "off"]));
        assert!(!settings.telemetry.enabled);
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "normalize": { "fallback_label": "whole page" } }"#).unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.normalize.fallback_label, "whole page");
        assert!(load_settings(Some(&dir.path().join("missing.json"))).is_err());
    }
}
