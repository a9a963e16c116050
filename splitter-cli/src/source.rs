//! Detection responses captured to disk.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use image::DynamicImage;
use log::debug;
use splitter_core::DetectionSource;

/// Replays a model response saved in a file instead of calling the model.
#[derive(Debug, Clone)]
pub struct FileDetectionSource {
    path: PathBuf,
}

impl FileDetectionSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DetectionSource for FileDetectionSource {
    fn detect(&self, image: &DynamicImage) -> Result<String> {
        debug!(
            "Reading detections for {}x{} image from {}",
            image.width(),
            image.height(),
            self.path.display()
        );
        fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read detections {}", self.path.display()))
    }
}
