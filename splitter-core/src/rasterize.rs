//! Cutting validated regions out of the source bitmap.
//!
//! Each region becomes an independent [`CropAsset`]: its own pixel buffer, the encoded bytes,
//! a random id and a display handle. Regions are processed one after another in input order.

use std::sync::Arc;

use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use log::{Level, debug, warn};
use serde::Serialize;
use splitter_utils::{ImageFormatHint, OutputOptions, encode_image, timing_guard};
use uuid::Uuid;

use crate::{
    error::SplitError,
    preview::{DisplayHandle, PreviewRegistry},
    region::{NormalizedBox, PixelRect, ValidatedRegion},
};

/// Turns a cropped bitmap into encoded bytes.
pub trait CropEncoder: Send + Sync {
    fn encode(&self, crop: &DynamicImage) -> Result<Vec<u8>>;

    /// Format of the bytes produced by [`CropEncoder::encode`].
    fn format(&self) -> ImageFormatHint;
}

/// Encoder backed by the shared output helpers. JPEG at default quality unless configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCropEncoder {
    options: OutputOptions,
}

impl ImageCropEncoder {
    pub fn new(options: OutputOptions) -> Self {
        Self { options }
    }
}

impl CropEncoder for ImageCropEncoder {
    fn encode(&self, crop: &DynamicImage) -> Result<Vec<u8>> {
        encode_image(crop, &self.options)
    }

    fn format(&self) -> ImageFormatHint {
        self.options.format
    }
}

/// One rasterized region.
#[derive(Debug, Clone, Serialize)]
pub struct CropAsset {
    /// Random UUID v4, unique per asset.
    pub id: String,
    pub label: String,
    /// Handle resolving to the decoded crop in the rasterizer's registry.
    pub handle: DisplayHandle,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    #[serde(skip)]
    pub format: ImageFormatHint,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "box")]
    pub bbox: NormalizedBox,
}

/// Produces crop assets and registers their previews.
pub struct CropRasterizer {
    encoder: Box<dyn CropEncoder>,
    previews: Arc<PreviewRegistry>,
}

impl CropRasterizer {
    /// Rasterizer with the default JPEG encoder and its own preview registry.
    pub fn new() -> Self {
        Self::with_encoder(
            Box::new(ImageCropEncoder::default()),
            Arc::new(PreviewRegistry::new()),
        )
    }

    pub fn with_encoder(encoder: Box<dyn CropEncoder>, previews: Arc<PreviewRegistry>) -> Self {
        Self { encoder, previews }
    }

    pub fn previews(&self) -> &Arc<PreviewRegistry> {
        &self.previews
    }

    /// Crop every region out of `image`.
    ///
    /// Fails only when `image` has no pixels. A region that maps to an empty rectangle or fails
    /// to encode is logged and left out, so the result can be shorter than `regions`.
    pub fn rasterize(
        &self,
        image: &DynamicImage,
        regions: &[ValidatedRegion],
    ) -> Result<Vec<CropAsset>, SplitError> {
        let (img_w, img_h) = image.dimensions();
        if img_w == 0 || img_h == 0 {
            return Err(SplitError::SourceImageUnreadable(format!(
                "image has no pixel data ({img_w}x{img_h})"
            )));
        }

        let _guard = timing_guard(
            format!("rasterize {} region(s) from {img_w}x{img_h}", regions.len()),
            Level::Debug,
        );

        let mut assets = Vec::with_capacity(regions.len());
        for region in regions {
            let rect = PixelRect::from_normalized(region.bbox(), img_w, img_h);
            if rect.is_empty() {
                warn!(
                    "Skipping '{}': {:?} maps to an empty {}x{} rectangle",
                    region.label(),
                    region.bbox(),
                    rect.width,
                    rect.height
                );
                continue;
            }

            let crop = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
            let bytes = match self.encoder.encode(&crop) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("Skipping '{}': encoding failed: {err:#}", region.label());
                    continue;
                }
            };

            let handle = self.previews.register(crop);
            debug!(
                "Cropped '{}' at ({}, {}) {}x{} -> {} byte(s)",
                region.label(),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                bytes.len()
            );
            assets.push(CropAsset {
                id: Uuid::new_v4().to_string(),
                label: region.label().to_string(),
                handle,
                bytes,
                format: self.encoder.format(),
                width: rect.width,
                height: rect.height,
                bbox: region.bbox(),
            });
        }
        Ok(assets)
    }
}

impl Default for CropRasterizer {
    fn default() -> Self {
        Self::new()
    }
}
