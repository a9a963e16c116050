//! Encoding and writing of crop images.
//!
//! Crops are encoded into memory first so callers can keep the bytes (for downloads or
//! history) and decide separately whether to write them to disk.

use crate::config::OutputSettings;

use anyhow::{Context, Result};
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder,
    codecs::{jpeg::JpegEncoder, png::PngEncoder, webp::WebPEncoder},
};
use log::debug;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

/// Image formats supported by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormatHint {
    Png,
    #[default]
    Jpeg,
    Webp,
}

impl ImageFormatHint {
    /// Canonical file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

impl std::str::FromStr for ImageFormatHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            other => Err(format!("unknown image format '{other}'")),
        }
    }
}

/// Resolved encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOptions {
    pub format: ImageFormatHint,
    /// `None` uses the JPEG encoder's built-in default quality.
    pub jpeg_quality: Option<u8>,
}

impl OutputOptions {
    pub fn from_settings(settings: &OutputSettings) -> Self {
        Self {
            format: settings.format_hint(),
            jpeg_quality: settings.jpeg_quality.map(|q| q.clamp(1, 100)),
        }
    }
}

/// Encode `image` into an in-memory buffer.
///
/// Zero-sized images are rejected because none of the codecs can represent them.
pub fn encode_image(image: &DynamicImage, options: &OutputOptions) -> Result<Vec<u8>> {
    anyhow::ensure!(
        image.width() > 0 && image.height() > 0,
        "cannot encode an empty {}x{} image",
        image.width(),
        image.height()
    );
    match options.format {
        ImageFormatHint::Jpeg => encode_jpeg(image, options.jpeg_quality),
        ImageFormatHint::Png => encode_png(image),
        ImageFormatHint::Webp => encode_webp(image),
    }
}

fn encode_jpeg(image: &DynamicImage, quality: Option<u8>) -> Result<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    {
        let encoder = match quality {
            Some(q) => JpegEncoder::new_with_quality(&mut buffer, q),
            None => JpegEncoder::new(&mut buffer),
        };
        encoder
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .context("failed to encode JPEG")?;
    }
    Ok(buffer)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .context("failed to encode PNG")?;
    Ok(buffer)
}

fn encode_webp(image: &DynamicImage) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .context("failed to encode WebP")?;
    Ok(buffer)
}

/// Write encoded bytes to `path`, creating the parent directory when needed.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    debug!("Writing {} byte(s) to {}", bytes.len(), path.display());
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
