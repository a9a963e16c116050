//! Validation and repair of detection model output.
//!
//! The model reports boxes as `[ymin, xmin, ymax, xmax]` on either a 0–1 or a 0–1000 scale,
//! sometimes inverted, out of range or degenerate. Normalization turns that into a non-empty
//! list of [`ValidatedRegion`]s. Only a response without a region list is an error; bad
//! entries are dropped.

use log::{Level, debug, warn};
use serde_json::Value;
use splitter_utils::{config::NormalizeSettings, timing_guard};

use crate::{
    error::SplitError,
    region::{NormalizedBox, RawRegion, ValidatedRegion},
};

/// Parameters of the normalization policy.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    /// Minimum width and height of a region, as a fraction of the image extent.
    pub min_dimension_fraction: f64,
    /// Boxes with any coordinate above 1 are divided by this value.
    pub scale_divisor: f64,
    /// Label of the full-image region used when nothing else survives.
    pub fallback_label: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        NormalizeSettings::default().into()
    }
}

impl From<NormalizeSettings> for NormalizeConfig {
    fn from(settings: NormalizeSettings) -> Self {
        Self {
            min_dimension_fraction: settings.min_dimension_fraction,
            scale_divisor: settings.scale_divisor,
            fallback_label: settings.fallback_label,
        }
    }
}

impl From<&NormalizeSettings> for NormalizeConfig {
    fn from(settings: &NormalizeSettings) -> Self {
        settings.clone().into()
    }
}

/// Normalize a detection response with the default policy.
pub fn normalize(raw: &Value) -> Result<Vec<ValidatedRegion>, SplitError> {
    normalize_with(raw, &NormalizeConfig::default())
}

/// Normalize a detection response.
///
/// `raw` must be an object with a list-valued `regions` field (`crops` is accepted as an
/// alias); otherwise [`SplitError::MalformedResponse`] is returned and nothing else happens.
pub fn normalize_with(
    raw: &Value,
    config: &NormalizeConfig,
) -> Result<Vec<ValidatedRegion>, SplitError> {
    let entries = region_entries(raw)?;
    let raw_regions: Vec<RawRegion> = entries.iter().map(RawRegion::from_value).collect();
    Ok(normalize_entries(&raw_regions, config))
}

fn region_entries(raw: &Value) -> Result<&[Value], SplitError> {
    let (key, field) = ["regions", "crops"]
        .into_iter()
        .find_map(|key| raw.get(key).map(|field| (key, field)))
        .ok_or_else(|| {
            SplitError::MalformedResponse("response has no `regions` field".to_string())
        })?;
    field
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SplitError::MalformedResponse(format!("`{key}` is not a list")))
}

/// Validate already-extracted entries. Never fails and never returns an empty list.
///
/// Surviving entries keep their relative order. Missing or empty labels become `region N`,
/// numbered by position among the surviving entries.
pub fn normalize_entries(entries: &[RawRegion], config: &NormalizeConfig) -> Vec<ValidatedRegion> {
    let _guard = timing_guard(format!("normalize {} region(s)", entries.len()), Level::Debug);

    let mut validated: Vec<ValidatedRegion> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(coords) = entry.coords else {
            debug!("Skipping region #{index}: missing or malformed box");
            continue;
        };
        let Some(bbox) = repair_box(coords, config) else {
            debug!("Skipping region #{index}: unusable box {coords:?}");
            continue;
        };

        let label = match entry.label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("region {}", validated.len() + 1),
        };
        validated.push(ValidatedRegion::new(label, bbox));
    }

    if validated.is_empty() {
        warn!(
            "No usable regions among {} entr(ies); falling back to the full image",
            entries.len()
        );
        validated.push(ValidatedRegion::new(
            config.fallback_label.clone(),
            NormalizedBox::FULL,
        ));
    }
    validated
}

/// Rescale, reorder, clamp and size-check one `[ymin, xmin, ymax, xmax]` box.
fn repair_box(mut coords: [f64; 4], config: &NormalizeConfig) -> Option<NormalizedBox> {
    if coords.iter().any(|c| !c.is_finite()) {
        return None;
    }

    // Heuristic: anything above 1 means the model used the 0-1000 scale for this box.
    if coords.iter().any(|&c| c > 1.0) {
        coords = coords.map(|c| c / config.scale_divisor);
    }

    let [mut ymin, mut xmin, mut ymax, mut xmax] = coords;
    if ymin > ymax {
        std::mem::swap(&mut ymin, &mut ymax);
    }
    if xmin > xmax {
        std::mem::swap(&mut xmin, &mut xmax);
    }

    let bbox = NormalizedBox::from_array([ymin, xmin, ymax, xmax].map(|c| c.clamp(0.0, 1.0)));
    let min_extent = config.min_dimension_fraction.max(f64::EPSILON);
    if bbox.width() < min_extent || bbox.height() < min_extent {
        return None;
    }
    Some(bbox)
}
