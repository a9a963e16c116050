use criterion::{Criterion, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::{Value, json};
use splitter_core::{CropRasterizer, normalize};
use std::hint::black_box;

fn build_page() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(1600, 1200, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    }))
}

/// A 4x3 grid in the 0-1000 scale with a few inverted and degenerate entries mixed in.
fn build_response() -> Value {
    let mut regions = Vec::new();
    for row in 0..3 {
        for col in 0..4 {
            let (top, left) = (row * 333, col * 250);
            let (bottom, right) = (top + 330, left + 245);
            let entry = if (row + col) % 5 == 0 {
                json!({ "label": format!("panel {row}-{col}"), "box": [bottom, right, top, left] })
            } else {
                json!({ "label": format!("panel {row}-{col}"), "box": [top, left, bottom, right] })
            };
            regions.push(entry);
        }
    }
    regions.push(json!({ "label": "sliver", "box": [0, 0, 5, 1000] }));
    json!({ "regions": regions })
}

fn split_pipeline_benchmark(c: &mut Criterion) {
    let page = build_page();
    let response = build_response();
    let rasterizer = CropRasterizer::new();

    c.bench_function("normalize_regions", |b| {
        b.iter(|| black_box(normalize(black_box(&response))));
    });

    let regions = normalize(&response).expect("bench response is well formed");
    c.bench_function("rasterize_grid", |b| {
        b.iter(|| {
            let assets = rasterizer
                .rasterize(black_box(&page), black_box(&regions))
                .expect("bench page has pixels");
            rasterizer
                .previews()
                .revoke_all(assets.iter().map(|asset| &asset.handle));
            black_box(assets);
        });
    });
}

criterion_group!(benches, split_pipeline_benchmark);
criterion_main!(benches);
