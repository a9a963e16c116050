//! Serializable manifest types for the splitter CLI.

use std::path::Path;

use serde::Serialize;
use splitter_core::CropAsset;

/// One exported crop as reported in the manifest.
#[derive(Debug, Serialize)]
pub struct ManifestRecord {
    pub id: String,
    pub label: String,
    /// Written file, or `None` when no output directory was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "box")]
    pub bbox: [f64; 4],
}

impl ManifestRecord {
    pub fn new(asset: &CropAsset, file: Option<&Path>) -> Self {
        Self {
            id: asset.id.clone(),
            label: asset.label.clone(),
            file: file.map(|p| p.display().to_string()),
            width: asset.width,
            height: asset.height,
            bbox: asset.bbox.to_array(),
        }
    }
}
