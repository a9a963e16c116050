mod annotate;
mod args;
mod config;
mod source;
mod types;

use std::{
    fs::{self, File},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};
use splitter_core::{
    CropRasterizer, ImageCropEncoder, NormalizeConfig, PreviewRegistry, SplitError, SplitSession,
    split_image, write_assets,
};
use splitter_utils::{
    OutputOptions, configure_telemetry, init_logging, load_image, normalize_path,
};

use crate::{
    annotate::annotate_regions,
    args::SplitArgs,
    config::{apply_cli_overrides, load_settings},
    source::FileDetectionSource,
    types::ManifestRecord,
};

fn main() -> Result<()> {
    init_logging(LevelFilter::Info)?;
    let args = SplitArgs::parse();

    let input_path = normalize_path(&args.input)?;
    let detections_path = normalize_path(&args.detections)?;
    let annotate_dir = if let Some(dir) = args.annotate.as_ref() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create annotation directory {}", dir.display()))?;
        Some(normalize_path(dir)?)
    } else {
        None
    };

    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args);
    if let Some(path) = args.save_config.as_ref() {
        settings.save_to_path(path)?;
        info!("Saved settings to {}", path.display());
    }
    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    let image = load_image(&input_path)?;
    info!(
        "Splitting {} ({}x{})",
        input_path.display(),
        image.width(),
        image.height()
    );

    let normalize_config: NormalizeConfig = (&settings.normalize).into();
    let encoder = ImageCropEncoder::new(OutputOptions::from_settings(&settings.output));
    let rasterizer =
        CropRasterizer::with_encoder(Box::new(encoder), Arc::new(PreviewRegistry::new()));
    let mut session = SplitSession::new(Arc::clone(rasterizer.previews()));

    let ticket = session.begin_run();
    let source = FileDetectionSource::new(detections_path);
    let outcome = split_image(&image, &source, &normalize_config, &rasterizer).map_err(|err| {
        let message = err.downcast_ref::<SplitError>().map(SplitError::user_message);
        match message {
            Some(message) => err.context(message),
            None => err,
        }
    })?;

    if let Some(dir) = annotate_dir.as_ref() {
        match annotate_regions(&image, &input_path, &outcome.regions, dir) {
            Ok(path) => info!("Annotated image saved to {}", path.display()),
            Err(err) => warn!("Failed to annotate {}: {err:#}", input_path.display()),
        }
    }

    if !session.commit(ticket, outcome.assets) {
        anyhow::bail!("split run was superseded before its results were committed");
    }
    if session.assets().is_empty() {
        warn!("No region could be rasterized; nothing to export");
    }

    let files: Vec<Option<PathBuf>> = match args.output_dir.as_ref() {
        Some(dir) => write_assets(dir, session.assets())?
            .into_iter()
            .map(Some)
            .collect(),
        None => vec![None; session.assets().len()],
    };
    let manifest: Vec<ManifestRecord> = session
        .assets()
        .iter()
        .zip(&files)
        .map(|(asset, file)| ManifestRecord::new(asset, file.as_deref()))
        .collect();

    if let Some(json_path) = args.json.as_ref() {
        if let Some(dir) = json_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let file = File::create(json_path)
            .with_context(|| format!("failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &manifest).with_context(|| {
            format!("failed to write crop manifest to {}", json_path.display())
        })?;
        info!("Wrote manifest to {}", json_path.display());
    } else {
        let json =
            serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;
        println!("{json}");
    }

    Ok(())
}
