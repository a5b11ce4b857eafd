//! MCP Server implementation using rmcp

use crate::config::ServerConfig;
use crate::overlay::{OverlayEvent, ParameterSet, ToggleState};
use crate::render::{composite, decode_page, element_styles, encode_png, stylesheet, ElementStyle};
use crate::session::{
    is_pdf_like, on_tab_removed, PageHost, PopupController, PopupView, SessionStore, TabId,
};
use anyhow::Result;
use base64::Engine;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rendered page bitmap
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PageImage {
    /// PNG file on disk
    Path {
        /// Path to the PNG file
        path: String,
    },
    /// Base64 encoded PNG data
    Base64 {
        /// Base64 encoded PNG content
        base64: String,
    },
}

impl<'de> serde::Deserialize<'de> for PageImage {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        if let Some(obj) = value.as_object() {
            if let Some(v) = obj.get("path") {
                if let Some(s) = v.as_str() {
                    return Ok(PageImage::Path {
                        path: s.to_string(),
                    });
                }
                return Err(serde::de::Error::custom("\"path\" must be a string"));
            }
            if let Some(v) = obj.get("base64") {
                if let Some(s) = v.as_str() {
                    return Ok(PageImage::Base64 {
                        base64: s.to_string(),
                    });
                }
                return Err(serde::de::Error::custom("\"base64\" must be a string"));
            }
            let keys: Vec<&String> = obj.keys().collect();
            Err(serde::de::Error::custom(format!(
                "Invalid image: expected an object with \"path\" or \"base64\", but got keys: {:?}",
                keys
            )))
        } else {
            Err(serde::de::Error::custom(
                "Invalid image: expected an object with \"path\" or \"base64\"",
            ))
        }
    }
}

/// PDF shade MCP Server
#[derive(Clone)]
pub struct ShadeServer {
    store: Arc<SessionStore>,
    pages: Arc<PageHost>,
    tool_router: ToolRouter<Self>,
    /// Server configuration
    config: Arc<ServerConfig>,
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TabParams {
    /// Browser tab identifier
    pub tab_id: TabId,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TabUrlParams {
    /// Browser tab identifier
    pub tab_id: TabId,
    /// URL of the document shown in the tab
    pub url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChangeSettingParams {
    /// Browser tab identifier
    pub tab_id: TabId,
    /// Single-key envelope, e.g. {"pdf_color": 200} or {"left_boundary": "30%"}
    pub message: serde_json::Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PreviewOverlayParams {
    /// Browser tab identifier
    pub tab_id: TabId,
    /// Rendered page as PNG: {"path": "..."} or {"base64": "..."}
    pub image: PageImage,
}

#[derive(Debug, Serialize)]
pub struct LoadPageResult {
    pub tab_id: TabId,
    pub pdf_like: bool,
}

#[derive(Debug, Serialize)]
pub struct OpenPopupResult {
    pub tab_id: TabId,
    #[serde(flatten)]
    pub view: PopupView,
}

#[derive(Debug, Serialize)]
pub struct ChangeSettingResult {
    pub tab_id: TabId,
    pub event: &'static str,
    pub parameters: ParameterSet,
}

#[derive(Debug, Serialize)]
pub struct ToggleResult {
    pub tab_id: TabId,
    pub toggle: ToggleState,
}

#[derive(Debug, Serialize)]
pub struct CloseTabResult {
    pub tab_id: TabId,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct OverlayResult {
    pub tab_id: TabId,
    pub initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    pub elements: Vec<ElementStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResult {
    pub tab_id: TabId,
    pub width: u32,
    pub height: u32,
    /// Composited page as base64 PNG
    pub png_base64: String,
}

/// Render a tool outcome as pretty JSON, logging failures
fn respond<T: Serialize>(tool: &str, result: crate::error::Result<T>) -> String {
    let response = match result {
        Ok(value) => serde_json::to_value(value).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, tool, "tool failed");
            serde_json::json!({ "error": e.client_message() })
        }
    };
    serde_json::to_string_pretty(&response).unwrap_or_default()
}

#[tool_router]
impl ShadeServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new ShadeServer with full configuration
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(SessionStore::new(config.max_tabs)),
            pages: Arc::new(PageHost::new(config.boundary_policy)),
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Attach a freshly loaded page to a tab
    #[tool(
        description = "Load a page in a browser tab. Any previous page in the tab is replaced and its overlay discarded. Call before open_popup."
    )]
    async fn load_page(&self, Parameters(params): Parameters<TabUrlParams>) -> String {
        respond("load_page", Ok(self.process_load_page(&params)))
    }

    /// Open the settings popup on a tab
    #[tool(
        description = "Open the overlay popup on a tab. A PDF tab seen for the first time gets the default overlay; a known tab gets its stored overlay restored. Non-PDF tabs report status \"not_pdf\"."
    )]
    async fn open_popup(&self, Parameters(params): Parameters<TabUrlParams>) -> String {
        respond("open_popup", self.process_open_popup(&params))
    }

    /// Change one overlay setting
    #[tool(
        description = "Change one overlay setting of a PDF tab. The message is a single-key object; keys: header_color, pdf_color, side_color (gray 0-255), header_contrast, pdf_contrast, side_contrast (percent 50-100), top_boundary (0-25), left_boundary (0-50), right_boundary (50-100), toggle (\"on\"/\"off\")."
    )]
    async fn change_setting(&self, Parameters(params): Parameters<ChangeSettingParams>) -> String {
        respond("change_setting", self.process_change_setting(&params))
    }

    /// Show or hide the overlay
    #[tool(description = "Flip the overlay of a PDF tab between shown and hidden.")]
    async fn toggle_overlay(&self, Parameters(params): Parameters<TabParams>) -> String {
        respond("toggle_overlay", self.process_toggle_overlay(&params))
    }

    /// Forget a closed tab
    #[tool(description = "Close a tab, dropping its stored settings and its page.")]
    async fn close_tab(&self, Parameters(params): Parameters<TabParams>) -> String {
        respond("close_tab", Ok(self.process_close_tab(&params)))
    }

    /// Current overlay styles of a tab
    #[tool(
        description = "Get the CSS the overlay of a tab currently renders with: the container plus header, left, pdf and right regions."
    )]
    async fn get_overlay(&self, Parameters(params): Parameters<TabParams>) -> String {
        respond("get_overlay", self.process_get_overlay(&params))
    }

    /// Composite the overlay onto a page bitmap
    #[tool(
        description = "Preview the overlay of a tab on a rendered page. Takes a PNG ({\"path\": \"...\"} or {\"base64\": \"...\"}) and returns the composited PNG as base64."
    )]
    async fn preview_overlay(
        &self,
        Parameters(params): Parameters<PreviewOverlayParams>,
    ) -> String {
        respond("preview_overlay", self.process_preview_overlay(&params))
    }
}

impl ShadeServer {
    fn popup(&self) -> PopupController<'_, PageHost> {
        PopupController::new(&self.store, &self.pages, &self.config.defaults)
    }

    pub fn process_load_page(&self, params: &TabUrlParams) -> LoadPageResult {
        self.pages.load_page(params.tab_id);
        LoadPageResult {
            tab_id: params.tab_id,
            pdf_like: is_pdf_like(&params.url),
        }
    }

    pub fn process_open_popup(
        &self,
        params: &TabUrlParams,
    ) -> crate::error::Result<OpenPopupResult> {
        let view = self.popup().open(params.tab_id, &params.url)?;
        Ok(OpenPopupResult {
            tab_id: params.tab_id,
            view,
        })
    }

    pub fn process_change_setting(
        &self,
        params: &ChangeSettingParams,
    ) -> crate::error::Result<ChangeSettingResult> {
        let event = OverlayEvent::from_envelope(&params.message)?;
        let name = event.name();
        let parameters = self.popup().change(params.tab_id, event)?;
        Ok(ChangeSettingResult {
            tab_id: params.tab_id,
            event: name,
            parameters,
        })
    }

    pub fn process_toggle_overlay(&self, params: &TabParams) -> crate::error::Result<ToggleResult> {
        let toggle = self.popup().toggle(params.tab_id)?;
        Ok(ToggleResult {
            tab_id: params.tab_id,
            toggle,
        })
    }

    pub fn process_close_tab(&self, params: &TabParams) -> CloseTabResult {
        CloseTabResult {
            tab_id: params.tab_id,
            removed: on_tab_removed(&self.store, &self.pages, params.tab_id),
        }
    }

    pub fn process_get_overlay(&self, params: &TabParams) -> crate::error::Result<OverlayResult> {
        let overlay = self.pages.overlay(params.tab_id)?;
        Ok(match overlay {
            Some(overlay) => OverlayResult {
                tab_id: params.tab_id,
                initialized: true,
                visible: Some(overlay.is_visible()),
                elements: element_styles(&overlay),
                stylesheet: Some(stylesheet(&overlay)),
            },
            None => OverlayResult {
                tab_id: params.tab_id,
                initialized: false,
                visible: None,
                elements: Vec::new(),
                stylesheet: None,
            },
        })
    }

    pub fn process_preview_overlay(
        &self,
        params: &PreviewOverlayParams,
    ) -> crate::error::Result<PreviewResult> {
        let overlay = self
            .pages
            .overlay(params.tab_id)?
            .ok_or(crate::error::Error::OverlayNotInitialized)?;

        let engine = base64::engine::general_purpose::STANDARD;
        let bytes = match &params.image {
            PageImage::Path { path } => std::fs::read(path)?,
            PageImage::Base64 { base64 } => engine.decode(base64)?,
        };

        let mut page = decode_page(&bytes, self.config.max_preview_pixels)?;
        composite(&overlay, &mut page);
        let (width, height) = page.dimensions();
        tracing::debug!(tab_id = params.tab_id, width, height, "overlay preview rendered");

        Ok(PreviewResult {
            tab_id: params.tab_id,
            width,
            height,
            png_base64: engine.encode(encode_png(&page)?),
        })
    }
}

impl Default for ShadeServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for ShadeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "PDF shade lays gray, contrast-adjusted panels over PDF pages for a dark-mode \
                 reading effect. Load a page, open the popup on its tab, then change settings."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let server = ShadeServer::with_config(config);

    tracing::info!("PDF shade server ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::overlay::BoundaryPolicy;
    use image::{Rgba, RgbaImage};
    use serde_json::json;

    const PDF_URL: &str = "https://example.com/paper.pdf";

    fn open_pdf_tab(server: &ShadeServer, tab_id: TabId) {
        let params = TabUrlParams {
            tab_id,
            url: PDF_URL.to_string(),
        };
        server.process_load_page(&params);
        server.process_open_popup(&params).unwrap();
    }

    fn change(server: &ShadeServer, tab_id: TabId, message: serde_json::Value) {
        server
            .process_change_setting(&ChangeSettingParams { tab_id, message })
            .unwrap();
    }

    #[test]
    fn test_page_image_deserialization() {
        let image: PageImage = serde_json::from_str(r#"{"path": "/tmp/page.png"}"#).unwrap();
        assert!(matches!(image, PageImage::Path { .. }));

        let image: PageImage = serde_json::from_str(r#"{"base64": "iVBORw0KGgo="}"#).unwrap();
        assert!(matches!(image, PageImage::Base64 { .. }));

        let err = serde_json::from_str::<PageImage>(r#"{"url": "https://x"}"#).unwrap_err();
        assert!(err.to_string().contains("\"path\" or \"base64\""));

        assert!(serde_json::from_str::<PageImage>(r#"{"path": 3}"#).is_err());
    }

    #[test]
    fn test_params_deserialization() {
        let json = r#"{"tab_id": 4, "message": {"side_color": "12"}}"#;
        let params: ChangeSettingParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.tab_id, 4);
        assert_eq!(params.message, json!({"side_color": "12"}));
    }

    #[test]
    fn test_load_page_reports_pdf_like() {
        let server = ShadeServer::new();
        let result = server.process_load_page(&TabUrlParams {
            tab_id: 1,
            url: "https://example.com/index.html".to_string(),
        });
        assert!(!result.pdf_like);
    }

    #[test]
    fn test_open_popup_without_page_fails() {
        let server = ShadeServer::new();
        let result = server.process_open_popup(&TabUrlParams {
            tab_id: 1,
            url: PDF_URL.to_string(),
        });
        assert!(matches!(result, Err(Error::NoReceiver { tab_id: 1 })));
    }

    #[test]
    fn test_open_popup_result_shape() {
        let server = ShadeServer::new();
        let params = TabUrlParams {
            tab_id: 3,
            url: PDF_URL.to_string(),
        };
        server.process_load_page(&params);
        let result = server.process_open_popup(&params).unwrap();
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["tab_id"], 3);
        assert_eq!(value["status"], "initialized");
        assert_eq!(value["parameters"]["toggle"], "on");
        assert_eq!(value["parameters"]["top_boundary"], 7.63);
    }

    #[test]
    fn test_get_overlay_styles() {
        let server = ShadeServer::new();
        open_pdf_tab(&server, 1);
        change(&server, 1, json!({"side_color": 10}));

        let result = server.process_get_overlay(&TabParams { tab_id: 1 }).unwrap();
        assert!(result.initialized);
        assert_eq!(result.visible, Some(true));
        assert_eq!(result.elements.len(), 5);
        assert_eq!(result.elements[2].get("background-color"), Some("#0a0a0a"));
        assert_eq!(result.elements[4].get("background-color"), Some("#0a0a0a"));
    }

    #[test]
    fn test_get_overlay_before_popup() {
        let server = ShadeServer::new();
        server.process_load_page(&TabUrlParams {
            tab_id: 1,
            url: PDF_URL.to_string(),
        });
        let result = server.process_get_overlay(&TabParams { tab_id: 1 }).unwrap();
        assert!(!result.initialized);
        assert!(result.elements.is_empty());
    }

    #[test]
    fn test_change_setting_rejects_unknown_event() {
        let server = ShadeServer::new();
        open_pdf_tab(&server, 1);
        let result = server.process_change_setting(&ChangeSettingParams {
            tab_id: 1,
            message: json!({"footer_color": 1}),
        });
        assert!(matches!(result, Err(Error::UnknownEvent { .. })));
    }

    #[test]
    fn test_toggle_overlay() {
        let server = ShadeServer::new();
        open_pdf_tab(&server, 1);

        let result = server.process_toggle_overlay(&TabParams { tab_id: 1 }).unwrap();
        assert_eq!(result.toggle, ToggleState::Off);
        let overlay = server.process_get_overlay(&TabParams { tab_id: 1 }).unwrap();
        assert_eq!(overlay.visible, Some(false));
        assert_eq!(overlay.elements[0].get("display"), Some("none"));
    }

    #[test]
    fn test_close_tab() {
        let server = ShadeServer::new();
        open_pdf_tab(&server, 1);

        assert!(server.process_close_tab(&TabParams { tab_id: 1 }).removed);
        assert!(!server.process_close_tab(&TabParams { tab_id: 1 }).removed);
        assert!(matches!(
            server.process_get_overlay(&TabParams { tab_id: 1 }),
            Err(Error::NoReceiver { tab_id: 1 })
        ));
    }

    #[test]
    fn test_rendered_sibling_policy_from_config() {
        let server = ShadeServer::with_config(ServerConfig {
            boundary_policy: BoundaryPolicy::RenderedSibling,
            ..ServerConfig::default()
        });
        open_pdf_tab(&server, 1);
        change(&server, 1, json!({"right_boundary": "80%"}));

        let result = server.process_get_overlay(&TabParams { tab_id: 1 }).unwrap();
        assert_eq!(result.elements[3].get("width"), Some("52.42%"));
    }

    #[test]
    fn test_preview_overlay_base64() {
        let server = ShadeServer::new();
        open_pdf_tab(&server, 1);

        let page = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
        let engine = base64::engine::general_purpose::STANDARD;
        let params = PreviewOverlayParams {
            tab_id: 1,
            image: PageImage::Base64 {
                base64: engine.encode(encode_png(&page).unwrap()),
            },
        };
        let result = server.process_preview_overlay(&params).unwrap();
        assert_eq!((result.width, result.height), (40, 20));

        let bytes = engine.decode(&result.png_base64).unwrap();
        let preview = decode_page(&bytes, u64::MAX).unwrap();
        assert_eq!(preview.get_pixel(20, 10), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_preview_overlay_path() {
        let server = ShadeServer::new();
        open_pdf_tab(&server, 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let page = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        std::fs::write(&path, encode_png(&page).unwrap()).unwrap();

        let params = PreviewOverlayParams {
            tab_id: 1,
            image: PageImage::Path {
                path: path.to_string_lossy().to_string(),
            },
        };
        let result = server.process_preview_overlay(&params).unwrap();
        assert_eq!((result.width, result.height), (10, 10));
    }

    #[test]
    fn test_preview_overlay_limits() {
        let server = ShadeServer::with_config(ServerConfig {
            max_preview_pixels: 50,
            ..ServerConfig::default()
        });
        open_pdf_tab(&server, 1);

        let page = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let engine = base64::engine::general_purpose::STANDARD;
        let params = PreviewOverlayParams {
            tab_id: 1,
            image: PageImage::Base64 {
                base64: engine.encode(encode_png(&page).unwrap()),
            },
        };
        assert!(matches!(
            server.process_preview_overlay(&params),
            Err(Error::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_preview_requires_overlay() {
        let server = ShadeServer::new();
        server.process_load_page(&TabUrlParams {
            tab_id: 1,
            url: PDF_URL.to_string(),
        });
        let params = PreviewOverlayParams {
            tab_id: 1,
            image: PageImage::Base64 {
                base64: String::new(),
            },
        };
        assert!(matches!(
            server.process_preview_overlay(&params),
            Err(Error::OverlayNotInitialized)
        ));
    }

    #[test]
    fn test_respond_error_is_sanitized() {
        let text = respond::<()>(
            "preview_overlay",
            Err(Error::InvalidImage {
                reason: "/secret/path".to_string(),
            }),
        );
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"error": "Invalid page image"}));
    }
}
