//! Geometry engine
//!
//! Pure transforms from boundary, color and contrast parameters to the style
//! values of the four overlay regions. All coordinates are percentages of the
//! viewport. The header spans the top strip; left, pdf and right share the
//! remaining height side by side. No ordering or range checks are made.

use serde::{Serialize, Serializer};
use std::fmt;

/// Fraction digits kept when rendering a percentage
const PERCENT_PRECISION: f64 = 1e6;

/// A viewport percentage
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percent(pub f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);
    pub const FULL: Percent = Percent(100.0);

    pub fn value(self) -> f64 {
        self.0
    }

    /// Value rounded to the rendered precision
    pub fn rounded(self) -> f64 {
        let r = (self.0 * PERCENT_PRECISION).round() / PERCENT_PRECISION;
        // Avoid rendering "-0%".
        if r == 0.0 {
            0.0
        } else {
            r
        }
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.rounded())
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Position and size of one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub top: Percent,
    pub left: Percent,
    pub width: Percent,
    pub height: Percent,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left.0 + self.width.0
    }

    pub fn bottom(&self) -> f64 {
        self.top.0 + self.height.0
    }
}

/// Equal-intensity gray, rendered as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayColor {
    intensity: i64,
}

impl GrayColor {
    pub fn intensity(self) -> i64 {
        self.intensity
    }

    /// Channel byte, `None` when the intensity does not fit in two hex digits
    pub fn channel(self) -> Option<u8> {
        u8::try_from(self.intensity).ok()
    }
}

impl fmt::Display for GrayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = if self.intensity < 0 {
            format!("-{:x}", self.intensity.unsigned_abs())
        } else {
            format!("{:x}", self.intensity)
        };
        if hex.len() == 1 {
            hex.insert(0, '0');
        }
        write!(f, "#{}", hex.repeat(3))
    }
}

impl Serialize for GrayColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Contrast filter expression, `contrast(n%)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastFilter {
    percent: i64,
}

impl ContrastFilter {
    pub fn percent(self) -> i64 {
        self.percent
    }

    /// Multiplier applied around mid-gray; negative amounts act as no filter
    pub fn amount(self) -> f64 {
        if self.percent < 0 {
            1.0
        } else {
            self.percent as f64 / 100.0
        }
    }
}

impl fmt::Display for ContrastFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contrast({}%)", self.percent)
    }
}

impl Serialize for ContrastFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Grayscale color for an intensity. Values outside 0..=255 still render,
/// but not as a valid color.
pub fn to_grayscale_color(intensity: i64) -> GrayColor {
    GrayColor { intensity }
}

/// Contrast filter for an integer percentage
pub fn to_contrast_filter(percent: i64) -> ContrastFilter {
    ContrastFilter { percent }
}

pub fn compute_header_geometry(top_boundary: f64) -> Rect {
    Rect {
        top: Percent::ZERO,
        left: Percent::ZERO,
        width: Percent::FULL,
        height: Percent(top_boundary),
    }
}

/// Height shared by the left, pdf and right regions
pub fn compute_lower_region_height(top_boundary: f64) -> Percent {
    Percent(100.0 - top_boundary)
}

pub fn compute_left_geometry(top_boundary: f64, left_boundary: f64) -> Rect {
    Rect {
        top: Percent(top_boundary),
        left: Percent::ZERO,
        width: Percent(left_boundary),
        height: compute_lower_region_height(top_boundary),
    }
}

/// Width left for the pdf region between two side regions
pub fn compute_pdf_width(left_width: f64, right_width: f64) -> Percent {
    Percent(100.0 - left_width - right_width)
}

pub fn compute_pdf_geometry(top_boundary: f64, left_boundary: f64, right_boundary: f64) -> Rect {
    Rect {
        top: Percent(top_boundary),
        left: Percent(left_boundary),
        width: compute_pdf_width(left_boundary, 100.0 - right_boundary),
        height: compute_lower_region_height(top_boundary),
    }
}

pub fn compute_right_geometry(top_boundary: f64, right_boundary: f64) -> Rect {
    Rect {
        top: Percent(top_boundary),
        left: Percent(right_boundary),
        width: Percent(100.0 - right_boundary),
        height: compute_lower_region_height(top_boundary),
    }
}
