//! Styling targets for a rendered overlay

pub mod css;
pub mod raster;

pub use css::{element_styles, stylesheet, Declaration, ElementStyle};
pub use raster::{composite, decode_page, encode_png};
