//! CSS styling target
//!
//! Turns an overlay into inline style declarations for the container element
//! and its four regions, ready to be applied to a page.

use crate::overlay::{OverlayState, RegionStyle};
use serde::Serialize;
use std::fmt::Write;

/// Element id of the overlay container
pub const CONTAINER_ID: &str = "overlay";

/// Declarations shared by every region: fixed, click-through, blended
const REGION_BASE: [(&str, &str); 4] = [
    ("position", "fixed"),
    ("pointer-events", "none"),
    ("mix-blend-mode", "difference"),
    ("z-index", "1"),
];

/// One `property: value` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

impl Declaration {
    fn new(property: &'static str, value: impl ToString) -> Self {
        Self {
            property,
            value: value.to_string(),
        }
    }
}

/// Declarations for one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementStyle {
    pub id: &'static str,
    pub declarations: Vec<Declaration>,
}

impl ElementStyle {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    /// Inline `style` attribute text
    pub fn inline(&self) -> String {
        self.declarations
            .iter()
            .map(|d| format!("{}: {};", d.property, d.value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn region_declarations(style: &RegionStyle) -> Vec<Declaration> {
    let mut declarations: Vec<_> = REGION_BASE
        .iter()
        .map(|&(property, value)| Declaration::new(property, value))
        .collect();
    declarations.extend([
        Declaration::new("background-color", style.background_color),
        Declaration::new("filter", style.filter),
        Declaration::new("top", style.rect.top),
        Declaration::new("left", style.rect.left),
        Declaration::new("width", style.rect.width),
        Declaration::new("height", style.rect.height),
    ]);
    declarations
}

/// Container first, then regions in stacking order
pub fn element_styles(overlay: &OverlayState) -> Vec<ElementStyle> {
    let display = if overlay.is_visible() { "block" } else { "none" };
    let mut elements = vec![ElementStyle {
        id: CONTAINER_ID,
        declarations: vec![Declaration::new("display", display)],
    }];
    elements.extend(overlay.regions().map(|(region, style)| ElementStyle {
        id: region.element_id(),
        declarations: region_declarations(style),
    }));
    elements
}

/// Stylesheet text with one id rule per element
pub fn stylesheet(overlay: &OverlayState) -> String {
    let mut css = String::new();
    for element in element_styles(overlay) {
        let _ = writeln!(css, "#{} {{", element.id);
        for d in &element.declarations {
            let _ = writeln!(css, "  {}: {};", d.property, d.value);
        }
        css.push_str("}\n");
    }
    css
}
