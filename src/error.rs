//! Error types for the PDF shade server

use thiserror::Error;

/// Result type alias for the PDF shade server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF shade server
#[derive(Error, Debug)]
pub enum Error {
    /// Event name outside the fixed catalogue
    #[error("Unknown event: {name}")]
    UnknownEvent { name: String },

    /// Message envelope is not a single-key object
    #[error("Malformed message envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// Payload has no numeric prefix or is not finite
    #[error("Invalid number for {field}: {value}")]
    InvalidNumber { field: String, value: String },

    /// Toggle payload other than "on"/"off"
    #[error("Invalid toggle state: {value}")]
    InvalidToggle { value: String },

    /// Event arrived before the overlay was created on the page
    #[error("Overlay has not been initialized")]
    OverlayNotInitialized,

    /// No session entry for the tab
    #[error("Tab not found in session store: {tab_id}")]
    TabNotFound { tab_id: u32 },

    /// Tab was examined and its document is not PDF-like
    #[error("Tab {tab_id} does not show a PDF document")]
    NotPdfTab { tab_id: u32 },

    /// No content context is listening for the tab
    #[error("No receiving end for tab {tab_id}")]
    NoReceiver { tab_id: u32 },

    /// Page bitmap could not be used for a preview
    #[error("Invalid page image: {reason}")]
    InvalidImage { reason: String },

    /// Page bitmap is larger than the configured limit
    #[error("Page image too large: {pixels} pixels (max: {max_pixels})")]
    ImageTooLarge { pixels: u64, max_pixels: u64 },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Image codec error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Paths and codec internals are omitted; log the full error first.
    pub fn client_message(&self) -> String {
        match self {
            Error::UnknownEvent { name } => format!("Unknown event: {}", name),
            Error::MalformedEnvelope { reason } => format!("Malformed message: {}", reason),
            Error::InvalidNumber { field, value } => {
                format!("Invalid number for {}: {}", field, value)
            }
            Error::InvalidToggle { value } => format!("Invalid toggle state: {}", value),
            Error::OverlayNotInitialized => "Overlay has not been initialized".to_string(),
            Error::TabNotFound { tab_id } => format!("Tab {} has no stored settings", tab_id),
            Error::NotPdfTab { tab_id } => format!("Tab {} does not show a PDF", tab_id),
            Error::NoReceiver { tab_id } => {
                format!("Could not connect to the page in tab {}", tab_id)
            }
            Error::InvalidImage { .. } => "Invalid page image".to_string(),
            Error::ImageTooLarge { max_pixels, .. } => {
                format!("Page image exceeds {} pixels", max_pixels)
            }
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::Image(_) => "Image processing error".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
        }
    }
}
