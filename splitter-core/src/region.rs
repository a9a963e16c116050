//! Region types passed between the normalizer and the rasterizer.

use serde::Serialize;
use serde_json::Value;

/// Axis-aligned box in unit-normalized image coordinates.
///
/// Field order follows the detection model's `[ymin, xmin, ymax, xmax]` convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl NormalizedBox {
    /// The whole image.
    pub const FULL: Self = Self {
        ymin: 0.0,
        xmin: 0.0,
        ymax: 1.0,
        xmax: 1.0,
    };

    pub fn from_array([ymin, xmin, ymax, xmax]: [f64; 4]) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// True when the box lies inside the unit square, is correctly ordered and both extents
    /// reach `min_fraction`.
    pub fn is_valid(&self, min_fraction: f64) -> bool {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        in_unit(self.ymin)
            && in_unit(self.xmin)
            && in_unit(self.ymax)
            && in_unit(self.xmax)
            && self.ymin < self.ymax
            && self.xmin < self.xmax
            && self.width() >= min_fraction
            && self.height() >= min_fraction
    }
}

/// One untrusted entry of a detection response.
///
/// Extraction never fails; anything that is not a label string or a 4-number box simply
/// comes out as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRegion {
    pub label: Option<String>,
    pub coords: Option<[f64; 4]>,
}

impl RawRegion {
    /// Pull a label and box out of a JSON entry. `box_2d` is accepted as an alias of `box`.
    pub fn from_value(value: &Value) -> Self {
        let label = value
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let coords = value
            .get("box")
            .or_else(|| value.get("box_2d"))
            .and_then(Value::as_array)
            .and_then(|items| parse_coords(items));
        Self { label, coords }
    }
}

fn parse_coords(items: &[Value]) -> Option<[f64; 4]> {
    let [a, b, c, d] = items else {
        return None;
    };
    Some([a.as_f64()?, b.as_f64()?, c.as_f64()?, d.as_f64()?])
}

/// A labeled region that satisfies every geometric invariant.
///
/// Only the normalizer constructs these; the fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRegion {
    label: String,
    #[serde(rename = "box")]
    bbox: NormalizedBox,
}

impl ValidatedRegion {
    pub(crate) fn new(label: String, bbox: NormalizedBox) -> Self {
        Self { label, bbox }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bbox(&self) -> NormalizedBox {
        self.bbox
    }
}

/// Integer pixel rectangle inside a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Map a normalized box onto an `img_w` x `img_h` bitmap.
    ///
    /// Each edge is rounded to the nearest pixel, then the origin and the extent are clamped so
    /// the rectangle never leaves the image. The result may be empty for very small images.
    pub fn from_normalized(bbox: NormalizedBox, img_w: u32, img_h: u32) -> Self {
        let (w, h) = (f64::from(img_w), f64::from(img_h));
        let to_px = |v: f64, max: u32| (v.round().max(0.0) as u32).min(max);

        let x = to_px(bbox.xmin * w, img_w);
        let y = to_px(bbox.ymin * h, img_h);
        let width = to_px(bbox.width() * w, img_w).min(img_w - x);
        let height = to_px(bbox.height() * h, img_h).min(img_h - y);

        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
