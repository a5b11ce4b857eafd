//! Per-tab session: store, page delivery, popup and tab lifecycle

pub mod background;
pub mod detect;
pub mod popup;
pub mod store;
pub mod transport;

pub use background::on_tab_removed;
pub use detect::is_pdf_like;
pub use popup::{PopupController, PopupView};
pub use store::{Session, SessionStore, TabEntry, TabId};
pub use transport::{MessageTransport, PageHost};
