//! Tab lifecycle collector

use crate::session::store::{SessionStore, TabId};
use crate::session::transport::PageHost;

/// Drop everything kept for a closed tab: its store entry and its page
pub fn on_tab_removed(store: &SessionStore, pages: &PageHost, tab_id: TabId) -> bool {
    let had_entry = store.remove(tab_id).is_some();
    let had_page = pages.unload_page(tab_id);
    if !had_entry {
        tracing::debug!(tab_id, "closed tab had no stored settings");
    }
    tracing::debug!(tab_id, had_page, "tab removed");
    had_entry || had_page
}
