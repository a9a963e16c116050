//! End-to-end split of one image: detect, extract, normalize, rasterize.

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use log::{Level, info};
use splitter_utils::timing_guard;

use crate::{
    error::SplitError,
    normalize::{NormalizeConfig, normalize_with},
    payload::extract_payload,
    rasterize::{CropAsset, CropRasterizer},
    region::ValidatedRegion,
};

/// The external region detector. Returns the model's raw text response.
pub trait DetectionSource {
    fn detect(&self, image: &DynamicImage) -> Result<String>;
}

impl<F> DetectionSource for F
where
    F: Fn(&DynamicImage) -> Result<String>,
{
    fn detect(&self, image: &DynamicImage) -> Result<String> {
        self(image)
    }
}

/// Output of [`split_image`].
#[derive(Debug)]
pub struct SplitOutcome {
    pub regions: Vec<ValidatedRegion>,
    pub assets: Vec<CropAsset>,
}

/// Run the whole pipeline on `image`.
///
/// Detection completes before anything is rasterized. Structural failures surface as a
/// [`SplitError`] inside the returned error and can be recovered with `downcast_ref`.
pub fn split_image(
    image: &DynamicImage,
    source: &dyn DetectionSource,
    config: &NormalizeConfig,
    rasterizer: &CropRasterizer,
) -> Result<SplitOutcome> {
    let _guard = timing_guard("split image", Level::Info);
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SplitError::SourceImageUnreadable(format!(
            "image has no pixel data ({width}x{height})"
        ))
        .into());
    }

    let text = source.detect(image).context("region detection failed")?;
    let payload = extract_payload(&text)?;
    let regions = normalize_with(&payload, config)?;
    let assets = rasterizer.rasterize(image, &regions)?;

    info!(
        "Split {width}x{height} image into {} crop(s) from {} region(s)",
        assets.len(),
        regions.len()
    );
    Ok(SplitOutcome { regions, assets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::cell::Cell;

    fn image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 20, Rgb([1, 2, 3])))
    }

    #[test]
    fn fenced_model_text_is_split() {
        let source = |_: &DynamicImage| -> Result<String> {
            Ok("```json\n{\"crops\": [{\"label\": \"left\", \"box_2d\": [0, 0, 1000, 500]}, \
                {\"label\": \"right\", \"box_2d\": [0, 500, 1000, 1000]}]}\n```"
                .to_string())
        };
        let outcome = split_image(
            &image(),
            &source,
            &NormalizeConfig::default(),
            &CropRasterizer::new(),
        )
        .unwrap();

        assert_eq!(outcome.regions.len(), 2);
        let sizes: Vec<_> = outcome.assets.iter().map(|a| (a.width, a.height)).collect();
        assert_eq!(sizes, [(15, 20), (15, 20)]);
    }

    #[test]
    fn malformed_response_is_reported_as_split_error() {
        let source = |_: &DynamicImage| -> Result<String> { Ok("{\"panels\": []}".into()) };
        let err = split_image(
            &image(),
            &source,
            &NormalizeConfig::default(),
            &CropRasterizer::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SplitError>(),
            Some(SplitError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_image_never_reaches_the_detector() {
        let calls = Cell::new(0);
        let source = |_: &DynamicImage| -> Result<String> {
            calls.set(calls.get() + 1);
            Ok("{\"regions\": []}".into())
        };
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = split_image(
            &empty,
            &source,
            &NormalizeConfig::default(),
            &CropRasterizer::new(),
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SplitError>(),
            Some(SplitError::SourceImageUnreadable(_))
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn detector_errors_propagate_with_context() {
        let source = |_: &DynamicImage| -> Result<String> { anyhow::bail!("quota exceeded") };
        let err = split_image(
            &image(),
            &source,
            &NormalizeConfig::default(),
            &CropRasterizer::new(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("quota exceeded"));
    }
}
