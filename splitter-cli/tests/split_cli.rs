use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use image::{GenericImageView, Rgb, RgbImage};
use serde::Deserialize;
use splitter_utils::{AppSettings, fixture_path};
use tempfile::tempdir;

#[derive(Debug, Deserialize)]
struct CropRecord {
    id: String,
    label: String,
    file: Option<String>,
    width: u32,
    height: u32,
    #[serde(rename = "box")]
    bbox: [f64; 4],
}

fn write_page(path: &Path, width: u32, height: u32) -> Result<(), Box<dyn Error>> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path)?;
    Ok(())
}

#[test]
fn grid_response_exports_four_named_crops() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let page = work_dir.path().join("page.png");
    write_page(&page, 80, 60)?;
    let out_dir = work_dir.path().join("crops");
    let json_path = work_dir.path().join("manifest.json");

    cargo_bin_cmd!("splitter")
        .current_dir(work_dir.path())
        .arg("--input")
        .arg(&page)
        .arg("--detections")
        .arg(fixture_path("responses/grid_2x2.json")?)
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--json")
        .arg(&json_path)
        .assert()
        .success();

    let records: Vec<CropRecord> = serde_json::from_str(&fs::read_to_string(&json_path)?)?;
    let labels: Vec<_> = records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "top-left panel",
            "top-right panel",
            "bottom-left panel",
            "bottom-right panel"
        ]
    );

    for record in &records {
        assert_eq!((record.width, record.height), (40, 30));
        let file = record.file.as_deref().expect("file written");
        let expected_name = format!("{}_{}.jpg", record.label.replace(' ', "_"), &record.id[..4]);
        assert!(file.ends_with(&expected_name), "{file} vs {expected_name}");
        let crop = image::open(file)?;
        assert_eq!(crop.dimensions(), (40, 30));
    }
    assert_eq!(records[3].bbox, [0.5, 0.5, 1.0, 1.0]);
    assert_eq!(fs::read_dir(&out_dir)?.count(), 4);
    Ok(())
}

#[test]
fn manifest_goes_to_stdout_without_json_flag() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let page = work_dir.path().join("page.png");
    write_page(&page, 50, 50)?;
    let detections = work_dir.path().join("empty.json");
    fs::write(&detections, r#"{ "regions": [] }"#)?;

    let output = cargo_bin_cmd!("splitter")
        .current_dir(work_dir.path())
        .arg("-i")
        .arg(&page)
        .arg("-d")
        .arg(&detections)
        .output()?;
    assert!(output.status.success());

    let records: Vec<CropRecord> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label, "full image");
    assert_eq!((records[0].width, records[0].height), (50, 50));
    assert!(records[0].file.is_none());
    Ok(())
}

#[test]
fn fenced_response_and_annotation() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let page = work_dir.path().join("strip.png");
    write_page(&page, 100, 100)?;
    let annotate_dir = work_dir.path().join("annotated");
    let json_path = work_dir.path().join("manifest.json");

    cargo_bin_cmd!("splitter")
        .current_dir(work_dir.path())
        .arg("-i")
        .arg(&page)
        .arg("-d")
        .arg(fixture_path("responses/fenced_response.txt")?)
        .arg("--annotate")
        .arg(&annotate_dir)
        .arg("--json")
        .arg(&json_path)
        .assert()
        .success();

    let records: Vec<CropRecord> = serde_json::from_str(&fs::read_to_string(&json_path)?)?;
    let sizes: Vec<_> = records.iter().map(|r| (r.width, r.height)).collect();
    assert_eq!(sizes, [(100, 48), (100, 48)]);
    assert!(annotate_dir.join("strip_regions.png").exists());
    Ok(())
}

#[test]
fn missing_regions_fails_without_writing_crops() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let page = work_dir.path().join("page.png");
    write_page(&page, 20, 20)?;
    let out_dir = work_dir.path().join("crops");

    let output = cargo_bin_cmd!("splitter")
        .current_dir(work_dir.path())
        .arg("-i")
        .arg(&page)
        .arg("-d")
        .arg(fixture_path("responses/missing_regions.json")?)
        .arg("--output-dir")
        .arg(&out_dir)
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Analysis failed"), "stderr: {stderr}");
    assert!(!out_dir.exists());
    Ok(())
}

#[test]
fn min_dimension_flag_filters_regions() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let page = work_dir.path().join("page.png");
    write_page(&page, 100, 100)?;
    let detections = work_dir.path().join("mixed.json");
    fs::write(
        &detections,
        r#"{ "regions": [
            { "label": "narrow", "box": [0, 0, 1000, 100] },
            { "label": "wide", "box": [0, 100, 1000, 1000] }
        ] }"#,
    )?;

    let output = cargo_bin_cmd!("splitter")
        .current_dir(work_dir.path())
        .arg("-i")
        .arg(&page)
        .arg("-d")
        .arg(&detections)
        .arg("--min-dimension")
        .arg("0.2")
        .output()?;
    assert!(output.status.success());

    let records: Vec<CropRecord> = serde_json::from_slice(&output.stdout)?;
    let labels: Vec<_> = records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["wide"]);
    Ok(())
}

#[test]
fn effective_settings_can_be_saved() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let page = work_dir.path().join("page.png");
    write_page(&page, 30, 30)?;
    let saved = work_dir.path().join("config/saved.json");

    cargo_bin_cmd!("splitter")
        .current_dir(work_dir.path())
        .arg("-i")
        .arg(&page)
        .arg("-d")
        .arg(fixture_path("responses/grid_2x2.json")?)
        .arg("--min-dimension")
        .arg("0.05")
        .arg("--jpeg-quality")
        .arg("85")
        .arg("--save-config")
        .arg(&saved)
        .assert()
        .success();

    let settings = AppSettings::load_from_path(&saved)?;
    assert_eq!(settings.normalize.min_dimension_fraction, 0.05);
    assert_eq!(settings.output.jpeg_quality, Some(85));
    assert_eq!(settings.output.format, "jpeg");
    Ok(())
}
