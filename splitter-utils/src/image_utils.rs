use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};

/// Load and decode an image from disk.
///
/// # Arguments
///
/// * `path` - The path to the image file.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path_ref = path.as_ref();
    let image = image::open(path_ref)
        .with_context(|| format!("failed to open image {}", path_ref.display()))?;
    ensure_has_pixels(&image)
        .with_context(|| format!("image {} has no pixel data", path_ref.display()))?;
    Ok(image)
}

/// Decode an in-memory image (e.g. an uploaded file) with format sniffing.
///
/// # Arguments
///
/// * `bytes` - Raw encoded image bytes.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes).context("failed to decode image bytes")?;
    ensure_has_pixels(&image)?;
    Ok(image)
}

/// Fail when an image has a zero width or height.
pub fn ensure_has_pixels(image: &DynamicImage) -> Result<()> {
    let (width, height) = image.dimensions();
    anyhow::ensure!(
        width > 0 && height > 0,
        "image dimensions must be non-zero (got {width}x{height})"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn decode_round_trips_png_bytes() {
        let img = RgbImage::from_pixel(5, 3, Rgb([1, 2, 3]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let decoded = decode_image_bytes(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (5, 3));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_image_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn load_image_reports_missing_file() {
        let err = load_image("does/not/exist.png").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.png"));
    }
}
