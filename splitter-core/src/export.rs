//! File naming and writing for downloaded crops.
//!
//! Exported files are named `{label}_{id prefix}.jpg`, with whitespace runs in the label
//! replaced by underscores. Existing download folders rely on that pattern.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use splitter_utils::write_bytes;

use crate::rasterize::CropAsset;

const ID_PREFIX_LEN: usize = 4;

/// Collapse whitespace runs to `_` and neutralize path separators.
pub fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_space = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        out.push(if matches!(ch, '/' | '\\') { '_' } else { ch });
    }
    out
}

/// Download file name of `asset`.
pub fn export_file_name(asset: &CropAsset) -> String {
    let prefix: String = asset.id.chars().take(ID_PREFIX_LEN).collect();
    format!(
        "{}_{prefix}.{}",
        sanitize_label(&asset.label),
        asset.format.extension()
    )
}

/// Write every asset into `dir`, returning the paths in asset order.
pub fn write_assets(dir: &Path, assets: &[CropAsset]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(assets.len());
    for asset in assets {
        let path = dir.join(export_file_name(asset));
        write_bytes(&path, &asset.bytes)
            .with_context(|| format!("failed to export crop '{}'", asset.label))?;
        written.push(path);
    }
    info!("Exported {} crop(s) to {}", written.len(), dir.display());
    Ok(written)
}
