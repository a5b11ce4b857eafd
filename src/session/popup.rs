//! Popup controller
//!
//! Keeps the session store and the tab's page in step: every settings change
//! is written to the store first and then sent to the page.

use crate::error::{Error, Result};
use crate::overlay::{OverlayEvent, ParameterSet, ToggleState};
use crate::session::detect::is_pdf_like;
use crate::session::store::{SessionStore, TabEntry, TabId};
use crate::session::transport::MessageTransport;
use serde::Serialize;

/// What the popup shows after opening on a tab
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PopupView {
    /// Tab seen before; its stored parameters were sent to the page again
    Restored { parameters: ParameterSet },
    /// First visit to a PDF tab; defaults were stored and sent
    Initialized { parameters: ParameterSet },
    /// Tab does not show a PDF; no controls
    NotPdf,
}

pub struct PopupController<'a, T: MessageTransport> {
    store: &'a SessionStore,
    transport: &'a T,
    defaults: &'a ParameterSet,
}

impl<'a, T: MessageTransport> PopupController<'a, T> {
    pub fn new(store: &'a SessionStore, transport: &'a T, defaults: &'a ParameterSet) -> Self {
        Self {
            store,
            transport,
            defaults,
        }
    }

    /// Open the popup on a tab showing `url`
    pub fn open(&self, tab_id: TabId, url: &str) -> Result<PopupView> {
        let mut session = self.store.session();
        match session.get(tab_id) {
            Some(TabEntry {
                pdf: true,
                parameters: Some(parameters),
            }) => {
                tracing::debug!(tab_id, "restoring tab state");
                self.transport
                    .send(tab_id, &OverlayEvent::Initialization(parameters.clone()))?;
                Ok(PopupView::Restored { parameters })
            }
            Some(TabEntry { pdf: false, .. }) => Ok(PopupView::NotPdf),
            Some(TabEntry {
                pdf: true,
                parameters: None,
            })
            | None => {
                if !is_pdf_like(url) {
                    tracing::debug!(tab_id, url, "tab is not a PDF");
                    let evicted = session.set(tab_id, TabEntry::not_pdf());
                    self.forget_page(evicted);
                    return Ok(PopupView::NotPdf);
                }
                tracing::info!(tab_id, url, "initializing tab with defaults");
                let parameters = ParameterSet {
                    toggle: ToggleState::On,
                    ..self.defaults.clone()
                };
                let evicted = session.set(tab_id, TabEntry::pdf(parameters.clone()));
                self.forget_page(evicted);
                self.transport
                    .send(tab_id, &OverlayEvent::Initialization(parameters.clone()))?;
                Ok(PopupView::Initialized { parameters })
            }
        }
    }

    /// Record a single settings change and forward it to the page. The
    /// store stays locked until the page has applied the change, so pages
    /// see changes in the order they were stored.
    pub fn change(&self, tab_id: TabId, event: OverlayEvent) -> Result<ParameterSet> {
        if let OverlayEvent::Initialization(_) = event {
            return Err(Error::MalformedEnvelope {
                reason: "initialization is not a settings change".to_string(),
            });
        }
        let mut session = self.store.session();
        let parameters = session.update_parameters(tab_id, |p| p.apply(&event))?;
        tracing::debug!(tab_id, event = event.name(), "setting changed");
        self.transport.send(tab_id, &event)?;
        Ok(parameters)
    }

    /// Flip the stored toggle and forward the new state
    pub fn toggle(&self, tab_id: TabId) -> Result<ToggleState> {
        let mut session = self.store.session();
        let parameters = session.update_parameters(tab_id, |p| p.toggle = p.toggle.flipped())?;
        let state = parameters.toggle;
        tracing::debug!(tab_id, state = state.as_str(), "overlay toggled");
        self.transport.send(tab_id, &OverlayEvent::Toggle(state))?;
        Ok(state)
    }

    /// An evicted tab has no stored settings left, so its page must not
    /// keep showing them
    fn forget_page(&self, evicted: Option<TabId>) {
        if let Some(evicted) = evicted {
            self.transport.discard_overlay(evicted);
        }
    }
}
