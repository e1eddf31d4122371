//! Fragment router with lazily materialized pages.
//!
//! # Module Structure
//!
//! ```text
//! router/
//! ├── route      # RouteEntry, RouteTable, built-in routes
//! ├── pages      # producers bound to route ids
//! ├── document   # headless document (pages, nav, error views)
//! ├── history    # fragment history
//! └── error      # RouterError, RenderError
//! ```
//!
//! # Navigation
//!
//! ```text
//! navigate(id) ─► resolve (unknown → home) ─► same as latest? ─► Unchanged
//!                     │ no home                  │ no
//!                     ▼                          ▼
//!              ConfigurationError      push #id, Loading, title
//!                                                │
//!                                     page cached? ─no─► producer ─► cache
//!                                                │                     │ Err
//!                                                ▼                     ▼
//!                           latest navigation? ─no─► Superseded   error view
//!                                                │ yes
//!                                                ▼
//!                   activate, nav links, close menu, routeChange, Ready
//! ```
//!
//! Every navigation takes a generation number; a completion that is no
//! longer the latest keeps its cached page but changes nothing else.

mod document;
mod error;
mod history;
mod pages;
mod route;

#[cfg(test)]
mod tests;

pub use document::{Document, HomeStats, NavLink, PageElement, SharedDocument};
pub use error::{RenderError, RouterError};
pub use history::{History, route_from_fragment};
pub use pages::AUDIENCES;
pub use route::{FALLBACK_ROUTES, Producer, RouteEntry, RouteTable};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::catalog::CatalogStore;
use crate::config::PageConfig;
use crate::events::{Event, EventBus};
use crate::{debug, log};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Initializing,
    Ready,
    Loading,
    ErrorDisplayed,
}

/// What a navigation call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The target page is now the active one.
    Activated { from: Option<String>, to: String },
    /// The resolved route was already active.
    Unchanged,
    /// A later navigation started before this one finished.
    Superseded,
    /// The producer failed; the error view is shown.
    Failed(RenderError),
}

#[derive(Debug)]
struct Status {
    state: RouterState,
    current: Option<String>,
    /// Target of the latest load still in flight.
    pending: Option<String>,
}

pub struct Router {
    home: String,
    catalog: Arc<CatalogStore>,
    events: Arc<EventBus>,
    document: SharedDocument,
    routes: RwLock<RouteTable>,
    history: Mutex<History>,
    status: Mutex<Status>,
    generation: AtomicU64,
}

/// Hides the loading indicator when a load finishes, however it finishes.
struct LoadingGuard<'a>(&'a SharedDocument);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().hide_loading();
    }
}

impl Router {
    pub fn new(
        home: impl Into<String>,
        catalog: Arc<CatalogStore>,
        events: Arc<EventBus>,
        document: SharedDocument,
    ) -> Self {
        Self {
            home: home.into(),
            catalog,
            events,
            document,
            routes: RwLock::new(RouteTable::new()),
            history: Mutex::new(History::default()),
            status: Mutex::new(Status {
                state: RouterState::Idle,
                current: None,
                pending: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Start at `fragment` instead of an empty location.
    pub fn with_location(self, fragment: &str) -> Self {
        *self.history.lock() = History::new(fragment);
        self
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn state(&self) -> RouterState {
        self.status.lock().state
    }

    pub fn current_route(&self) -> Option<String> {
        self.status.lock().current.clone()
    }

    /// Current location fragment, without `#`.
    pub fn location(&self) -> String {
        self.history.lock().fragment().to_string()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().len()
    }

    /// Add or replace a single route.
    pub fn register(&self, entry: RouteEntry) {
        let mut routes = self.routes.write();
        routes.insert(entry);
        self.sync_nav_links(&routes);
    }

    /// Register routes (`pages`, or the built-in table) and load the route
    /// in the current location without pushing history.
    pub async fn initialize(
        &self,
        pages: Option<&IndexMap<String, PageConfig>>,
    ) -> Result<Navigation, RouterError> {
        self.status.lock().state = RouterState::Initializing;

        let table = RouteTable::build(pages, &self.catalog);
        debug!("router"; "registered {} routes", table.len());
        self.sync_nav_links(&table);
        *self.routes.write() = table;

        let route = {
            let history = self.history.lock();
            route_from_fragment(history.fragment(), &self.home).to_string()
        };
        self.load(&route).await
    }

    /// Navigate to `route`, pushing `#<route>` when `push_history`.
    ///
    /// Unknown routes resolve to the home route.
    pub async fn navigate(
        &self,
        route: &str,
        push_history: bool,
    ) -> Result<Navigation, RouterError> {
        let resolved = self
            .routes
            .read()
            .resolve(route, &self.home)
            .map(|entry| (entry.id.clone(), entry.title.clone()));
        let Some((resolved, title)) = resolved else {
            return Err(self.configuration_error(route));
        };

        let stays_active = {
            let mut status = self.status.lock();
            let latest = status.pending.as_ref().or(status.current.as_ref());
            if latest == Some(&resolved) {
                debug!("router"; "already on {}", resolved);
                return Ok(Navigation::Unchanged);
            }
            // Back to the active route while another load is in flight:
            // that load is superseded and the active page stays.
            let stays_active = status.current.as_ref() == Some(&resolved);
            if stays_active {
                self.generation.fetch_add(1, Ordering::SeqCst);
                status.pending = None;
                status.state = RouterState::Ready;
            }
            stays_active
        };

        if push_history {
            self.history.lock().push(&resolved);
        }
        if stays_active {
            debug!("router"; "staying on {}", resolved);
            self.document.lock().set_title(&title);
            return Ok(Navigation::Unchanged);
        }
        self.load(&resolved).await
    }

    /// Reload the route named by the current fragment (empty → home),
    /// without touching history. Runs the load sequence even when that
    /// route is already active.
    pub async fn handle_pop_state(&self) -> Result<Navigation, RouterError> {
        let route = {
            let history = self.history.lock();
            route_from_fragment(history.fragment(), &self.home).to_string()
        };
        self.load(&route).await
    }

    /// Step back in history. `None` at the first entry.
    pub async fn back(&self) -> Result<Option<Navigation>, RouterError> {
        if !self.history.lock().back() {
            return Ok(None);
        }
        self.handle_pop_state().await.map(Some)
    }

    /// Step forward in history. `None` at the last entry.
    pub async fn forward(&self) -> Result<Option<Navigation>, RouterError> {
        if !self.history.lock().forward() {
            return Ok(None);
        }
        self.handle_pop_state().await.map(Some)
    }

    /// The error view's return button.
    pub async fn return_home(&self) -> Result<Navigation, RouterError> {
        let home = self.home.clone();
        self.navigate(&home, true).await
    }

    // ========================================================================
    // load sequence
    // ========================================================================

    async fn load(&self, requested: &str) -> Result<Navigation, RouterError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let entry = self.routes.read().resolve(requested, &self.home).cloned();
        let Some(entry) = entry else {
            return Err(self.configuration_error(requested));
        };

        {
            let mut status = self.status.lock();
            status.state = RouterState::Loading;
            status.pending = Some(entry.id.clone());
        }
        {
            let mut document = self.document.lock();
            document.show_loading();
            document.set_title(&entry.title);
        }
        let _indicator = LoadingGuard(&self.document);

        let rendered = self.materialize(&entry).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("router"; "navigation to {} superseded", entry.id);
            return Ok(Navigation::Superseded);
        }

        if let Err(err) = rendered {
            log!("error"; "{}", err);
            self.document
                .lock()
                .show_error(&err.to_string(), &self.home);
            let mut status = self.status.lock();
            status.state = RouterState::ErrorDisplayed;
            status.current = None;
            status.pending = None;
            return Ok(Navigation::Failed(err));
        }

        {
            let mut document = self.document.lock();
            document.activate(&entry.id);
            document.update_nav(&entry.id);
            document.set_menu_open(false);
        }
        let from = {
            let mut status = self.status.lock();
            status.state = RouterState::Ready;
            status.pending = None;
            status.current.replace(entry.id.clone())
        };

        debug!("router"; "{} -> {}", from.as_deref().unwrap_or("-"), entry.id);
        self.events.publish(&Event::RouteChange {
            from: from.clone(),
            to: entry.id.clone(),
        });

        Ok(Navigation::Activated { from, to: entry.id })
    }

    /// Create the page element for `entry` once; later visits reuse it.
    async fn materialize(&self, entry: &RouteEntry) -> Result<(), RenderError> {
        if self.document.lock().has_page(&entry.id) {
            return Ok(());
        }

        let html = entry.produce().await?;
        if !self.document.lock().insert_page(&entry.id, html) {
            debug!("router"; "page {} was created concurrently, keeping it", entry.id);
        }
        Ok(())
    }

    fn configuration_error(&self, requested: &str) -> RouterError {
        let err = RouterError::Configuration {
            requested: requested.to_string(),
            home: self.home.clone(),
        };
        log!("error"; "{}", err);

        self.document
            .lock()
            .show_error(&err.to_string(), &self.home);
        let mut status = self.status.lock();
        status.state = RouterState::ErrorDisplayed;
        status.current = None;
        status.pending = None;
        err
    }

    fn sync_nav_links(&self, routes: &RouteTable) {
        self.document.lock().set_nav_links(
            routes
                .iter()
                .map(|entry| (entry.id.clone(), entry.label().to_string())),
        );
    }
}
