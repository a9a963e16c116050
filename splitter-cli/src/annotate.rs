//! Overlay of validated regions on the source image.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use splitter_core::{PixelRect, ValidatedRegion};
use splitter_utils::{ImageFormatHint, OutputOptions, encode_image, write_bytes};

const OUTLINE_WIDTH: u32 = 3;

/// Draw every region's outline on a copy of `image` and save it as PNG into `output_dir`.
pub fn annotate_regions(
    image: &DynamicImage,
    source_path: &Path,
    regions: &[ValidatedRegion],
    output_dir: &Path,
) -> Result<PathBuf> {
    let overlay = draw_regions(image, regions);

    let stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let output_path = output_dir.join(format!("{stem}_regions.png"));

    let options = OutputOptions {
        format: ImageFormatHint::Png,
        jpeg_quality: None,
    };
    let bytes = encode_image(&DynamicImage::ImageRgba8(overlay), &options)
        .context("failed to encode annotated image")?;
    write_bytes(&output_path, &bytes)
        .with_context(|| format!("failed to save annotated image {}", output_path.display()))?;
    Ok(output_path)
}

/// Copy of `image` with one colored outline per region.
pub fn draw_regions(image: &DynamicImage, regions: &[ValidatedRegion]) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    let (img_w, img_h) = canvas.dimensions();

    for (index, region) in regions.iter().enumerate() {
        let rect = PixelRect::from_normalized(region.bbox(), img_w, img_h);
        if rect.is_empty() {
            continue;
        }
        let color = outline_color(index);
        // Inset successive outlines so thick borders stay inside the region.
        for inset in 0..OUTLINE_WIDTH {
            if rect.width <= inset * 2 || rect.height <= inset * 2 {
                break;
            }
            let outline = Rect::at((rect.x + inset) as i32, (rect.y + inset) as i32)
                .of_size(rect.width - inset * 2, rect.height - inset * 2);
            draw_hollow_rect_mut(&mut canvas, outline, color);
        }
    }
    canvas
}

fn outline_color(index: usize) -> Rgba<u8> {
    const PALETTE: [[u8; 4]; 4] = [
        [255, 0, 0, 255],
        [0, 200, 0, 255],
        [0, 90, 255, 255],
        [255, 170, 0, 255],
    ];
    Rgba(PALETTE[index % PALETTE.len()])
}
