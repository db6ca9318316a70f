//! The menu cache orchestrator.
//!
//! Lifecycle: `Uninitialized -> Hydrating -> Ready`.
//!
//! On activation the local table is read. If it already holds the menu the
//! cache goes straight to `Ready`; otherwise the menu is fetched, every image
//! is localized, the result is inserted, and that same in-memory set becomes
//! the view. Once `Ready`, each change to the selected categories or the
//! settled search text re-queries the local table.

use std::collections::{BTreeMap, BTreeSet};

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use crate::api::MenuSource;
use crate::assets::ImageLocalizer;
use crate::models::{MenuItem, Section};
use crate::store::{MenuStore, StorageError};

/// Maximum concurrent image downloads during hydration.
const MAX_CONCURRENT_DOWNLOADS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Uninitialized,
    Hydrating,
    Ready,
}

pub struct MenuCache<S, L> {
    store: MenuStore,
    source: S,
    localizer: L,
    state: MenuState,
    view: Vec<MenuItem>,
    selected: BTreeSet<Section>,
    /// Case-folded settled search text.
    search: String,
    alert: Option<String>,
    query_count: u64,
}

impl<S: MenuSource, L: ImageLocalizer> MenuCache<S, L> {
    pub fn new(store: MenuStore, source: S, localizer: L) -> Self {
        Self {
            store,
            source,
            localizer,
            state: MenuState::Uninitialized,
            view: Vec::new(),
            selected: BTreeSet::new(),
            search: String::new(),
            alert: None,
            query_count: 0,
        }
    }

    // ===== Activation =====

    /// Load the menu, hydrating from the network if the local table is empty.
    ///
    /// Does nothing once `Ready`. On failure the view is left empty, an alert
    /// is recorded for the user, and the cache returns to `Uninitialized` so
    /// activation can be retried.
    pub async fn activate(&mut self) -> Result<(), StorageError> {
        if self.state == MenuState::Ready {
            debug!("Menu cache already ready");
            return Ok(());
        }

        match self.load_or_hydrate().await {
            Ok(items) => {
                info!(count = items.len(), "Menu ready");
                self.view = items;
                self.state = MenuState::Ready;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load menu");
                self.view.clear();
                self.state = MenuState::Uninitialized;
                self.alert = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn load_or_hydrate(&mut self) -> Result<Vec<MenuItem>, StorageError> {
        self.store.ensure_schema()?;

        let stored = self.store.select_all()?;
        if !stored.is_empty() {
            debug!(count = stored.len(), "Menu loaded from local store");
            return Ok(stored);
        }

        self.state = MenuState::Hydrating;
        info!("Local menu empty, hydrating from network");

        let fetched = self.source.fetch_menu().await;
        let mut localized = self.localize_all(fetched).await;

        let ids = self.store.insert_all(&localized)?;
        for (item, id) in localized.iter_mut().zip(ids) {
            item.id = Some(id);
        }

        Ok(localized)
    }

    /// Replace every item's image name with its local path, preserving order.
    /// Each distinct image name is localized once, however many items share it.
    async fn localize_all(&self, mut items: Vec<MenuItem>) -> Vec<MenuItem> {
        let localizer = &self.localizer;
        let names: BTreeSet<String> = items.iter().map(|item| item.image.clone()).collect();

        let paths = stream::iter(names)
            .map(|name| async move {
                let path = localizer.localize(&name).await;
                (name, path)
            })
            .buffered(MAX_CONCURRENT_DOWNLOADS)
            .collect::<BTreeMap<_, _>>()
            .await;

        for item in &mut items {
            if let Some(path) = paths.get(&item.image) {
                item.image = path.clone();
            }
        }
        items
    }

    // ===== Filters =====

    /// Select the section if unselected, unselect it otherwise.
    pub fn toggle_category(&mut self, section: Section) {
        if !self.selected.remove(&section) {
            self.selected.insert(section);
        }
        self.filters_changed();
    }

    pub fn set_categories(&mut self, sections: impl IntoIterator<Item = Section>) {
        let sections: BTreeSet<Section> = sections.into_iter().collect();
        if sections != self.selected {
            self.selected = sections;
            self.filters_changed();
        }
    }

    pub fn clear_categories(&mut self) {
        self.set_categories([]);
    }

    /// Apply a settled search string. Raw keystrokes should go through a
    /// [`crate::cache::SearchDebouncer`] first.
    pub fn set_search(&mut self, raw: &str) {
        let folded = raw.to_lowercase();
        if folded != self.search {
            self.search = folded;
            self.filters_changed();
        }
    }

    /// Selected sections, or every section when none is selected.
    pub fn effective_categories(&self) -> BTreeSet<String> {
        let sections: Vec<Section> = if self.selected.is_empty() {
            Section::ALL.to_vec()
        } else {
            self.selected.iter().copied().collect()
        };
        sections.iter().map(|s| s.key().to_string()).collect()
    }

    fn filters_changed(&mut self) {
        if self.state != MenuState::Ready {
            // The first view comes from activation alone
            debug!(state = ?self.state, "Filter change before menu ready, not re-querying");
            return;
        }
        self.requery();
    }

    fn requery(&mut self) {
        let categories = self.effective_categories();
        self.view = self.store.select_by_categories(&categories, &self.search);
        self.query_count += 1;
        debug!(
            categories = ?categories,
            query = %self.search,
            results = self.view.len(),
            "Menu re-queried"
        );
    }

    // ===== Accessors =====

    pub fn view(&self) -> &[MenuItem] {
        &self.view
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn selected_categories(&self) -> &BTreeSet<Section> {
        &self.selected
    }

    pub fn search_query(&self) -> &str {
        &self.search
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Take the pending alert so it is shown once.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Number of filter re-queries issued since creation.
    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    pub fn store(&self) -> &MenuStore {
        &self.store
    }
}

// ============================================================================
// Tests
// ============================================================================
