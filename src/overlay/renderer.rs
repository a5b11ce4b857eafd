//! Overlay renderer
//!
//! Owns the styled state of the overlay container and its four regions for
//! one page. The state is built once from a full parameter set and then
//! mutated in place by single-setting changes.

use crate::overlay::geometry::{
    compute_header_geometry, compute_left_geometry, compute_lower_region_height,
    compute_pdf_geometry, compute_pdf_width, compute_right_geometry, to_contrast_filter,
    to_grayscale_color, ContrastFilter, GrayColor, Percent, Rect,
};
use crate::overlay::params::ParameterSet;
use serde::{Deserialize, Serialize};

/// One of the four visual regions, in stacking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Header,
    Left,
    Pdf,
    Right,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Header, Region::Left, Region::Pdf, Region::Right];

    /// Element id of the region inside the overlay container
    pub fn element_id(self) -> &'static str {
        match self {
            Region::Header => "header_overlay",
            Region::Left => "left_overlay",
            Region::Pdf => "pdf_overlay",
            Region::Right => "right_overlay",
        }
    }
}

/// Target of a color or contrast setting. `Side` pairs the left and right
/// regions; they cannot be styled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionGroup {
    Header,
    Pdf,
    Side,
}

impl RegionGroup {
    pub fn regions(self) -> &'static [Region] {
        match self {
            RegionGroup::Header => &[Region::Header],
            RegionGroup::Pdf => &[Region::Pdf],
            RegionGroup::Side => &[Region::Left, Region::Right],
        }
    }
}

/// How the pdf region's width is derived when one side boundary changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Recompute from the page's current parameter set
    #[default]
    Recompute,
    /// Use the width the opposite side region currently renders with
    RenderedSibling,
}

/// Style values applied to one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStyle {
    #[serde(flatten)]
    pub rect: Rect,
    pub background_color: GrayColor,
    pub filter: ContrastFilter,
}

/// Rendered overlay: container visibility plus the four regions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayState {
    visible: bool,
    header: RegionStyle,
    left: RegionStyle,
    pdf: RegionStyle,
    right: RegionStyle,
}

impl OverlayState {
    /// Build the container and all regions from a full parameter set
    pub fn create(params: &ParameterSet) -> Self {
        let top = params.top_boundary;
        let side = |rect| RegionStyle {
            rect,
            background_color: to_grayscale_color(params.side_color),
            filter: to_contrast_filter(params.side_contrast),
        };

        Self {
            visible: params.toggle.is_on(),
            header: RegionStyle {
                rect: compute_header_geometry(top),
                background_color: to_grayscale_color(params.header_color),
                filter: to_contrast_filter(params.header_contrast),
            },
            left: side(compute_left_geometry(top, params.left_boundary)),
            pdf: RegionStyle {
                rect: compute_pdf_geometry(top, params.left_boundary, params.right_boundary),
                background_color: to_grayscale_color(params.pdf_color),
                filter: to_contrast_filter(params.pdf_contrast),
            },
            right: side(compute_right_geometry(top, params.right_boundary)),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn region(&self, region: Region) -> &RegionStyle {
        match region {
            Region::Header => &self.header,
            Region::Left => &self.left,
            Region::Pdf => &self.pdf,
            Region::Right => &self.right,
        }
    }

    fn region_mut(&mut self, region: Region) -> &mut RegionStyle {
        match region {
            Region::Header => &mut self.header,
            Region::Left => &mut self.left,
            Region::Pdf => &mut self.pdf,
            Region::Right => &mut self.right,
        }
    }

    /// Regions in stacking order
    pub fn regions(&self) -> impl Iterator<Item = (Region, &RegionStyle)> {
        Region::ALL.into_iter().map(move |r| (r, self.region(r)))
    }

    /// Show or hide the container. Region styles are left untouched.
    pub fn set_visibility(&mut self, on: bool) {
        self.visible = on;
    }

    pub fn set_region_color(&mut self, group: RegionGroup, intensity: i64) {
        let color = to_grayscale_color(intensity);
        for &region in group.regions() {
            self.region_mut(region).background_color = color;
        }
    }

    pub fn set_region_contrast(&mut self, group: RegionGroup, percent: i64) {
        let filter = to_contrast_filter(percent);
        for &region in group.regions() {
            self.region_mut(region).filter = filter;
        }
    }

    /// Header height plus top and height of the three lower regions
    pub fn set_top_boundary(&mut self, value: f64) {
        let lower_height = compute_lower_region_height(value);
        self.header.rect.height = Percent(value);
        for rect in [&mut self.left.rect, &mut self.pdf.rect, &mut self.right.rect] {
            rect.top = Percent(value);
            rect.height = lower_height;
        }
    }

    /// Left region width plus pdf left edge and width. `right_width` is the
    /// width of the right region the pdf region must leave room for.
    pub fn set_left_boundary(&mut self, value: f64, right_width: f64) {
        self.left.rect.width = Percent(value);
        self.pdf.rect.left = Percent(value);
        self.pdf.rect.width = compute_pdf_width(value, right_width);
    }

    /// Right region edge and width plus pdf width. `left_width` is the width
    /// of the left region the pdf region must leave room for.
    pub fn set_right_boundary(&mut self, value: f64, left_width: f64) {
        let right_width = 100.0 - value;
        self.right.rect.left = Percent(value);
        self.right.rect.width = Percent(right_width);
        self.pdf.rect.width = compute_pdf_width(left_width, right_width);
    }
}
