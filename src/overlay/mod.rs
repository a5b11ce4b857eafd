//! Overlay core: geometry, rendered state and event routing
//!
//! This module has no I/O. Values handed to it are already delivered and
//! decoded; everything it does is synchronous.

pub mod coerce;
pub mod geometry;
pub mod params;
pub mod renderer;
pub mod router;

pub use coerce::NumericInput;
pub use geometry::{
    compute_header_geometry, compute_left_geometry, compute_lower_region_height,
    compute_pdf_geometry, compute_pdf_width, compute_right_geometry, to_contrast_filter,
    to_grayscale_color, ContrastFilter, GrayColor, Percent, Rect,
};
pub use params::{ParameterSet, ToggleState};
pub use renderer::{BoundaryPolicy, OverlayState, Region, RegionGroup, RegionStyle};
pub use router::{MessageRouter, OverlayEvent};
