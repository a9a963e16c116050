//! Region extraction for composite images.
//!
//! This crate turns the untrusted region list returned by a detection model into validated
//! unit-space boxes, then cuts each box out of the decoded source image as an independent
//! encoded crop with a display handle.

/// Structural failures of a split run.
pub mod error;
/// Export file naming and writing.
pub mod export;
/// Repair and validation of raw detection boxes.
pub mod normalize;
/// JSON extraction from model text.
pub mod payload;
/// Detect, normalize and rasterize in one call.
pub mod pipeline;
/// Display handles for decoded crops.
pub mod preview;
/// Crop extraction and encoding.
pub mod rasterize;
/// Raw, validated and pixel-space region types.
pub mod region;
/// Result-set ownership across runs.
pub mod session;

pub use error::SplitError;
pub use export::{export_file_name, sanitize_label, write_assets};
pub use normalize::{NormalizeConfig, normalize, normalize_entries, normalize_with};
pub use payload::extract_payload;
pub use pipeline::{DetectionSource, SplitOutcome, split_image};
pub use preview::{DisplayHandle, PreviewRegistry};
pub use rasterize::{CropAsset, CropEncoder, CropRasterizer, ImageCropEncoder};
pub use region::{NormalizedBox, PixelRect, RawRegion, ValidatedRegion};
pub use session::{RunTicket, SplitSession};

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
