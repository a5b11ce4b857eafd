//! Per-tab session store

use crate::error::{Error, Result};
use crate::overlay::ParameterSet;
use lru::LruCache;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::num::NonZeroUsize;

/// Browser tab identifier
pub type TabId = u32;

/// What the store remembers about a tab
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabEntry {
    /// Whether the tab's document was recognized as a PDF
    pub pdf: bool,
    /// Last known overlay parameters; only PDF tabs have them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterSet>,
}

impl TabEntry {
    pub fn pdf(parameters: ParameterSet) -> Self {
        Self {
            pdf: true,
            parameters: Some(parameters),
        }
    }

    pub fn not_pdf() -> Self {
        Self {
            pdf: false,
            parameters: None,
        }
    }
}

/// Session-scoped key-value store keyed by tab id.
/// Holds at most `max_tabs` entries; the least recently used tab goes first.
pub struct SessionStore {
    inner: Mutex<LruCache<TabId, TabEntry>>,
}

/// Exclusive access to the store. Work done while a `Session` is alive is
/// atomic with respect to every other store user.
pub struct Session<'a> {
    tabs: MutexGuard<'a, LruCache<TabId, TabEntry>>,
}

impl Session<'_> {
    pub fn get(&mut self, tab_id: TabId) -> Option<TabEntry> {
        self.tabs.get(&tab_id).cloned()
    }

    /// Store a tab's entry, replacing any previous one. Returns the tab
    /// evicted to make room, if any.
    pub fn set(&mut self, tab_id: TabId, entry: TabEntry) -> Option<TabId> {
        match self.tabs.push(tab_id, entry) {
            Some((evicted, _)) if evicted != tab_id => {
                tracing::warn!(evicted_tab = evicted, "session store full, evicted tab");
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Change the stored parameters of a PDF tab and return the new set
    pub fn update_parameters<F>(&mut self, tab_id: TabId, update: F) -> Result<ParameterSet>
    where
        F: FnOnce(&mut ParameterSet),
    {
        let entry = self
            .tabs
            .get_mut(&tab_id)
            .ok_or(Error::TabNotFound { tab_id })?;
        let parameters = entry
            .parameters
            .as_mut()
            .ok_or(Error::NotPdfTab { tab_id })?;
        update(parameters);
        Ok(parameters.clone())
    }
}

impl SessionStore {
    /// Create a store holding at most `max_tabs` entries
    pub fn new(max_tabs: usize) -> Self {
        let capacity = NonZeroUsize::new(max_tabs).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Lock the store until the returned session is dropped
    pub fn session(&self) -> Session<'_> {
        Session {
            tabs: self.inner.lock(),
        }
    }

    /// Get a tab's entry
    pub fn get(&self, tab_id: TabId) -> Option<TabEntry> {
        self.session().get(tab_id)
    }

    /// Store a tab's entry; returns the evicted tab, if any
    pub fn set(&self, tab_id: TabId, entry: TabEntry) -> Option<TabId> {
        self.session().set(tab_id, entry)
    }

    /// Change the stored parameters of a PDF tab and return the new set
    pub fn update_parameters<F>(&self, tab_id: TabId, update: F) -> Result<ParameterSet>
    where
        F: FnOnce(&mut ParameterSet),
    {
        self.session().update_parameters(tab_id, update)
    }

    /// Check if a tab has an entry
    pub fn contains(&self, tab_id: TabId) -> bool {
        self.inner.lock().contains(&tab_id)
    }

    /// Remove a tab's entry
    pub fn remove(&self, tab_id: TabId) -> Option<TabEntry> {
        self.inner.lock().pop(&tab_id)
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Get the number of stored tabs
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
