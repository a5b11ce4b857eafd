//! Message delivery from the popup side to tab pages

use crate::error::{Error, Result};
use crate::overlay::{BoundaryPolicy, MessageRouter, OverlayEvent, OverlayState};
use crate::session::store::TabId;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Delivers an event envelope to the page shown in a tab
pub trait MessageTransport {
    /// Fails with [`Error::NoReceiver`] when no page listens in the tab
    fn send(&self, tab_id: TabId, event: &OverlayEvent) -> Result<()>;

    /// Drop the overlay shown in the tab, keeping its page attached.
    /// Returns whether an overlay was shown.
    fn discard_overlay(&self, tab_id: TabId) -> bool;
}

/// In-process page contexts, one message router per loaded tab
pub struct PageHost {
    pages: Mutex<HashMap<TabId, MessageRouter>>,
    policy: BoundaryPolicy,
}

impl PageHost {
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Attach a fresh page to the tab. A page already loaded there is
    /// replaced, overlay included, as on navigation.
    pub fn load_page(&self, tab_id: TabId) {
        let replaced = self
            .pages
            .lock()
            .insert(tab_id, MessageRouter::new(self.policy))
            .is_some();
        tracing::debug!(tab_id, replaced, "page loaded");
    }

    /// Detach the tab's page; returns whether one was loaded
    pub fn unload_page(&self, tab_id: TabId) -> bool {
        self.pages.lock().remove(&tab_id).is_some()
    }

    pub fn has_page(&self, tab_id: TabId) -> bool {
        self.pages.lock().contains_key(&tab_id)
    }

    /// Snapshot of the tab's overlay, `None` while not yet initialized
    pub fn overlay(&self, tab_id: TabId) -> Result<Option<OverlayState>> {
        let pages = self.pages.lock();
        let router = pages.get(&tab_id).ok_or(Error::NoReceiver { tab_id })?;
        Ok(router.overlay().cloned())
    }

    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }
}

impl MessageTransport for PageHost {
    fn send(&self, tab_id: TabId, event: &OverlayEvent) -> Result<()> {
        let envelope = event.to_envelope();
        let mut pages = self.pages.lock();
        let router = pages
            .get_mut(&tab_id)
            .ok_or(Error::NoReceiver { tab_id })?;
        router.handle_envelope(&envelope)
    }

    fn discard_overlay(&self, tab_id: TabId) -> bool {
        let mut pages = self.pages.lock();
        let Some(router) = pages.get_mut(&tab_id) else {
            return false;
        };
        let had_overlay = router.overlay().is_some();
        *router = MessageRouter::new(self.policy);
        tracing::debug!(tab_id, had_overlay, "overlay discarded");
        had_overlay
    }
}
