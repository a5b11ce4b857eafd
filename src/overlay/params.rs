//! Per-tab overlay parameters

use crate::error::{Error, Result};
use crate::overlay::coerce::NumericInput;
use crate::overlay::router::OverlayEvent;
use serde::{Deserialize, Serialize};

/// Whether the overlay is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    #[default]
    On,
    Off,
}

impl ToggleState {
    /// Decode a toggle payload; only `"on"` and `"off"` are accepted
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value.as_str() {
            Some("on") => Ok(ToggleState::On),
            Some("off") => Ok(ToggleState::Off),
            _ => Err(Error::InvalidToggle {
                value: value.to_string(),
            }),
        }
    }

    pub fn is_on(self) -> bool {
        self == ToggleState::On
    }

    pub fn flipped(self) -> Self {
        match self {
            ToggleState::On => ToggleState::Off,
            ToggleState::Off => ToggleState::On,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToggleState::On => "on",
            ToggleState::Off => "off",
        }
    }
}

/// Complete configuration for one tab's overlay.
///
/// Colors are gray intensities meant for 0..=255, contrasts percentages meant
/// for 50..=100, boundaries viewport percentages (top 0..=25, left 0..=50,
/// right 50..=100). None of these ranges is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameterSet")]
pub struct ParameterSet {
    pub toggle: ToggleState,
    pub header_color: i64,
    pub header_contrast: i64,
    pub pdf_color: i64,
    pub pdf_contrast: i64,
    pub side_color: i64,
    pub side_contrast: i64,
    pub top_boundary: f64,
    pub left_boundary: f64,
    pub right_boundary: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            toggle: ToggleState::On,
            header_color: 0,
            header_contrast: 50,
            pdf_color: 255,
            pdf_contrast: 100,
            side_color: 0,
            side_contrast: 50,
            top_boundary: 7.63,
            left_boundary: 27.58,
            right_boundary: 71.28,
        }
    }
}

impl ParameterSet {
    /// Record a single settings change
    pub fn apply(&mut self, event: &OverlayEvent) {
        match event {
            OverlayEvent::Initialization(params) => *self = params.clone(),
            OverlayEvent::Toggle(state) => self.toggle = *state,
            OverlayEvent::HeaderColor(v) => self.header_color = *v,
            OverlayEvent::HeaderContrast(v) => self.header_contrast = *v,
            OverlayEvent::PdfColor(v) => self.pdf_color = *v,
            OverlayEvent::PdfContrast(v) => self.pdf_contrast = *v,
            OverlayEvent::SideColor(v) => self.side_color = *v,
            OverlayEvent::SideContrast(v) => self.side_contrast = *v,
            OverlayEvent::TopBoundary(v) => self.top_boundary = *v,
            OverlayEvent::LeftBoundary(v) => self.left_boundary = *v,
            OverlayEvent::RightBoundary(v) => self.right_boundary = *v,
        }
    }
}

/// Wire form of a parameter set: form values may be numbers or strings,
/// and the toggle may be absent (shown).
#[derive(Debug, Deserialize)]
struct RawParameterSet {
    #[serde(default)]
    toggle: ToggleState,
    header_color: NumericInput,
    header_contrast: NumericInput,
    pdf_color: NumericInput,
    pdf_contrast: NumericInput,
    side_color: NumericInput,
    side_contrast: NumericInput,
    top_boundary: NumericInput,
    left_boundary: NumericInput,
    right_boundary: NumericInput,
}

impl TryFrom<RawParameterSet> for ParameterSet {
    type Error = Error;

    fn try_from(raw: RawParameterSet) -> Result<Self> {
        Ok(Self {
            toggle: raw.toggle,
            header_color: raw.header_color.truncate_int("header_color")?,
            header_contrast: raw.header_contrast.truncate_int("header_contrast")?,
            pdf_color: raw.pdf_color.truncate_int("pdf_color")?,
            pdf_contrast: raw.pdf_contrast.truncate_int("pdf_contrast")?,
            side_color: raw.side_color.truncate_int("side_color")?,
            side_contrast: raw.side_contrast.truncate_int("side_contrast")?,
            top_boundary: raw.top_boundary.to_float("top_boundary")?,
            left_boundary: raw.left_boundary.to_float("left_boundary")?,
            right_boundary: raw.right_boundary.to_float("right_boundary")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let params = ParameterSet::default();
        assert!(params.toggle.is_on());
        assert_eq!(params.pdf_color, 255);
        assert_eq!(params.top_boundary, 7.63);
        assert_eq!(params.left_boundary, 27.58);
        assert_eq!(params.right_boundary, 71.28);
    }

    #[test]
    fn test_deserialize_form_strings() {
        // Shape of the values a settings form stores.
        let json = r#"{
            "pdf": true,
            "header_color": "0",
            "header_contrast": "50",
            "pdf_color": "255",
            "pdf_contrast": "100",
            "side_color": "0",
            "side_contrast": "50",
            "top_boundary": "7.63%",
            "left_boundary": "27.58%",
            "right_boundary": "71.28%"
        }"#;
        let params: ParameterSet = serde_json::from_str(json).unwrap();
        assert_eq!(params, ParameterSet::default());
    }

    #[test]
    fn test_deserialize_toggle_off() {
        let mut value = serde_json::to_value(ParameterSet::default()).unwrap();
        value["toggle"] = serde_json::json!("off");
        let params: ParameterSet = serde_json::from_value(value).unwrap();
        assert_eq!(params.toggle, ToggleState::Off);
    }

    #[test]
    fn test_deserialize_rejects_missing_field() {
        let json = r#"{"header_color": 0}"#;
        assert!(serde_json::from_str::<ParameterSet>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_non_numeric() {
        let mut value = serde_json::to_value(ParameterSet::default()).unwrap();
        value["pdf_contrast"] = serde_json::json!("high");
        let err = serde_json::from_value::<ParameterSet>(value).unwrap_err();
        assert!(err.to_string().contains("pdf_contrast"));
    }

    #[test]
    fn test_apply_single_field() {
        let mut params = ParameterSet::default();
        params.apply(&OverlayEvent::SideContrast(80));
        params.apply(&OverlayEvent::LeftBoundary(30.0));
        params.apply(&OverlayEvent::Toggle(ToggleState::Off));

        let expected = ParameterSet {
            side_contrast: 80,
            left_boundary: 30.0,
            toggle: ToggleState::Off,
            ..ParameterSet::default()
        };
        assert_eq!(params, expected);
    }

    #[test]
    fn test_toggle_state() {
        assert_eq!(ToggleState::On.flipped(), ToggleState::Off);
        assert_eq!(ToggleState::Off.flipped(), ToggleState::On);
        assert_eq!(
            ToggleState::from_json(&serde_json::json!("off")).unwrap(),
            ToggleState::Off
        );
        assert!(matches!(
            ToggleState::from_json(&serde_json::json!(true)),
            Err(Error::InvalidToggle { .. })
        ));
    }
}
