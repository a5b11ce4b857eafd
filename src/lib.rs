//! PDF shade library
//!
//! Lays four gray, contrast-adjusted panels over a PDF page so that a light
//! document reads like a dark one. Exposed as MCP tools:
//! - `load_page` / `close_tab`: tab lifecycle
//! - `open_popup`: restore or initialize a tab's overlay
//! - `change_setting` / `toggle_overlay`: adjust colors, contrasts and boundaries
//! - `get_overlay` / `preview_overlay`: render the overlay as CSS or onto a page bitmap

pub mod config;
pub mod error;
pub mod overlay;
pub mod render;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use overlay::{BoundaryPolicy, MessageRouter, OverlayEvent, OverlayState, ParameterSet};
pub use server::{run_server_with_config, PageImage, ShadeServer};
pub use session::{PageHost, PopupController, PopupView, SessionStore, TabId};
