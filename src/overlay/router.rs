//! Message router for the page side
//!
//! Settings changes arrive as single-key envelopes, `{"pdf_color": 200}`.
//! Each envelope decodes into one [`OverlayEvent`] and is applied to the
//! page's overlay in arrival order.

use crate::error::{Error, Result};
use crate::overlay::coerce::NumericInput;
use crate::overlay::params::{ParameterSet, ToggleState};
use crate::overlay::renderer::{BoundaryPolicy, OverlayState, Region, RegionGroup};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed catalogue of overlay events, one value each
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Initialization(ParameterSet),
    Toggle(ToggleState),
    HeaderColor(i64),
    HeaderContrast(i64),
    PdfColor(i64),
    PdfContrast(i64),
    SideColor(i64),
    SideContrast(i64),
    TopBoundary(f64),
    LeftBoundary(f64),
    RightBoundary(f64),
}

impl OverlayEvent {
    /// Wire names of every event
    pub const NAMES: [&'static str; 11] = [
        "initialization",
        "toggle",
        "header_color",
        "header_contrast",
        "pdf_color",
        "pdf_contrast",
        "side_color",
        "side_contrast",
        "top_boundary",
        "left_boundary",
        "right_boundary",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OverlayEvent::Initialization(_) => "initialization",
            OverlayEvent::Toggle(_) => "toggle",
            OverlayEvent::HeaderColor(_) => "header_color",
            OverlayEvent::HeaderContrast(_) => "header_contrast",
            OverlayEvent::PdfColor(_) => "pdf_color",
            OverlayEvent::PdfContrast(_) => "pdf_contrast",
            OverlayEvent::SideColor(_) => "side_color",
            OverlayEvent::SideContrast(_) => "side_contrast",
            OverlayEvent::TopBoundary(_) => "top_boundary",
            OverlayEvent::LeftBoundary(_) => "left_boundary",
            OverlayEvent::RightBoundary(_) => "right_boundary",
        }
    }

    /// Decode a named event, coercing its payload
    pub fn decode(name: &str, value: &Value) -> Result<Self> {
        let int = |v: &Value| -> Result<i64> {
            NumericInput::from_json(name, v)?.truncate_int(name)
        };
        let float = |v: &Value| -> Result<f64> {
            NumericInput::from_json(name, v)?.to_float(name)
        };

        Ok(match name {
            "initialization" => {
                OverlayEvent::Initialization(ParameterSet::deserialize(value.clone())?)
            }
            "toggle" => OverlayEvent::Toggle(ToggleState::from_json(value)?),
            "header_color" => OverlayEvent::HeaderColor(int(value)?),
            "header_contrast" => OverlayEvent::HeaderContrast(int(value)?),
            "pdf_color" => OverlayEvent::PdfColor(int(value)?),
            "pdf_contrast" => OverlayEvent::PdfContrast(int(value)?),
            "side_color" => OverlayEvent::SideColor(int(value)?),
            "side_contrast" => OverlayEvent::SideContrast(int(value)?),
            "top_boundary" => OverlayEvent::TopBoundary(float(value)?),
            "left_boundary" => OverlayEvent::LeftBoundary(float(value)?),
            "right_boundary" => OverlayEvent::RightBoundary(float(value)?),
            other => {
                return Err(Error::UnknownEvent {
                    name: other.to_string(),
                })
            }
        })
    }

    /// Decode a `{name: value}` envelope
    pub fn from_envelope(envelope: &Value) -> Result<Self> {
        let obj = envelope.as_object().ok_or_else(|| Error::MalformedEnvelope {
            reason: format!("expected an object, got {}", json_kind(envelope)),
        })?;

        let mut entries = obj.iter();
        match (entries.next(), entries.next()) {
            (Some((name, value)), None) => Self::decode(name, value),
            (None, _) => Err(Error::MalformedEnvelope {
                reason: "empty envelope".to_string(),
            }),
            (Some(_), Some(_)) => Err(Error::MalformedEnvelope {
                reason: format!(
                    "expected exactly one event, got keys: {:?}",
                    obj.keys().collect::<Vec<_>>()
                ),
            }),
        }
    }

    /// Payload as sent on the wire
    pub fn payload(&self) -> Value {
        match self {
            OverlayEvent::Initialization(params) => {
                serde_json::to_value(params).unwrap_or(Value::Null)
            }
            OverlayEvent::Toggle(state) => Value::from(state.as_str()),
            OverlayEvent::HeaderColor(v)
            | OverlayEvent::HeaderContrast(v)
            | OverlayEvent::PdfColor(v)
            | OverlayEvent::PdfContrast(v)
            | OverlayEvent::SideColor(v)
            | OverlayEvent::SideContrast(v) => Value::from(*v),
            OverlayEvent::TopBoundary(v)
            | OverlayEvent::LeftBoundary(v)
            | OverlayEvent::RightBoundary(v) => Value::from(*v),
        }
    }

    pub fn to_envelope(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert(self.name().to_string(), self.payload());
        Value::Object(obj)
    }
}

impl Serialize for OverlayEvent {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_envelope().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OverlayEvent {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        OverlayEvent::from_envelope(&value).map_err(serde::de::Error::custom)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "an array",
        Value::String(_) => "a string",
        Value::Number(_) => "a number",
        Value::Bool(_) => "a boolean",
        Value::Null => "null",
        Value::Object(_) => "an object",
    }
}

/// Overlay plus the parameters the page has seen so far
#[derive(Debug, Clone)]
struct PageOverlay {
    overlay: OverlayState,
    params: ParameterSet,
}

/// Routes events to the page's overlay. Holds no overlay until the first
/// `initialization` event arrives.
#[derive(Debug, Clone, Default)]
pub struct MessageRouter {
    page: Option<PageOverlay>,
    policy: BoundaryPolicy,
}

impl MessageRouter {
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self { page: None, policy }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn overlay(&self) -> Option<&OverlayState> {
        self.page.as_ref().map(|p| &p.overlay)
    }

    /// Decode an envelope and dispatch it
    pub fn handle_envelope(&mut self, envelope: &Value) -> Result<()> {
        let event = OverlayEvent::from_envelope(envelope)?;
        self.dispatch(event)
    }

    /// Apply one event. Creation is idempotent; every other event needs an
    /// overlay to exist.
    pub fn dispatch(&mut self, event: OverlayEvent) -> Result<()> {
        tracing::debug!(event = event.name(), "dispatching overlay event");

        if let OverlayEvent::Initialization(params) = event {
            self.create_overlay(params);
            return Ok(());
        }

        let policy = self.policy;
        let page = self.page.as_mut().ok_or(Error::OverlayNotInitialized)?;
        page.params.apply(&event);
        let overlay = &mut page.overlay;

        match event {
            // Handled above.
            OverlayEvent::Initialization(_) => {}
            OverlayEvent::Toggle(state) => overlay.set_visibility(state.is_on()),
            OverlayEvent::HeaderColor(v) => overlay.set_region_color(RegionGroup::Header, v),
            OverlayEvent::HeaderContrast(v) => {
                overlay.set_region_contrast(RegionGroup::Header, v)
            }
            OverlayEvent::PdfColor(v) => overlay.set_region_color(RegionGroup::Pdf, v),
            OverlayEvent::PdfContrast(v) => overlay.set_region_contrast(RegionGroup::Pdf, v),
            OverlayEvent::SideColor(v) => overlay.set_region_color(RegionGroup::Side, v),
            OverlayEvent::SideContrast(v) => overlay.set_region_contrast(RegionGroup::Side, v),
            OverlayEvent::TopBoundary(v) => overlay.set_top_boundary(v),
            OverlayEvent::LeftBoundary(v) => {
                let right_width = match policy {
                    BoundaryPolicy::Recompute => 100.0 - page.params.right_boundary,
                    BoundaryPolicy::RenderedSibling => {
                        overlay.region(Region::Right).rect.width.value()
                    }
                };
                overlay.set_left_boundary(v, right_width);
            }
            OverlayEvent::RightBoundary(v) => {
                let left_width = match policy {
                    BoundaryPolicy::Recompute => page.params.left_boundary,
                    BoundaryPolicy::RenderedSibling => {
                        overlay.region(Region::Left).rect.width.value()
                    }
                };
                overlay.set_right_boundary(v, left_width);
            }
        }
        Ok(())
    }

    fn create_overlay(&mut self, params: ParameterSet) {
        if self.page.is_some() {
            tracing::debug!("overlay already created, ignoring initialization");
            return;
        }
        tracing::info!(visible = params.toggle.is_on(), "creating overlay");
        self.page = Some(PageOverlay {
            overlay: OverlayState::create(&params),
            params,
        });
    }
}
