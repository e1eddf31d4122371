//! Application context and startup.
//!
//! `App` owns every long-lived component and wires them together; nothing
//! is global. Startup order:
//!
//! 1. persisted `user_config` overrides applied, `configReady` published
//! 2. theme restored (persisted `theme`, else the configured default)
//! 3. global handlers subscribed (`themeChange`, `routeChange`, `dataReady`)
//! 4. core datasets preloaded, `dataReady` published
//! 5. router initialized at the current location
//!
//! The loading indicator is shown for the whole sequence. A startup error
//! replaces the content with the fatal reload prompt.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use crate::catalog::CatalogStore;
use crate::config::{ConfigHandle, SiteConfig, USER_CONFIG_KEY, UserConfig};
use crate::events::{Event, EventBus, EventKind};
use crate::router::{Document, HomeStats, Router, SharedDocument};
use crate::storage::{PersistentStore, StorageError};
use crate::{debug, log};

/// Storage key of the active theme.
pub const THEME_KEY: &str = "theme";

pub struct App {
    config: Arc<ConfigHandle>,
    storage: Arc<PersistentStore>,
    events: Arc<EventBus>,
    catalog: Arc<CatalogStore>,
    document: SharedDocument,
    router: Router,
    started: AtomicBool,
}

impl App {
    pub fn new(config: SiteConfig, storage: Arc<PersistentStore>, catalog: Arc<CatalogStore>) -> Self {
        let events = Arc::new(EventBus::new());
        let document = Document::shared();
        let router = Router::new(
            config.routing.default_page.clone(),
            Arc::clone(&catalog),
            Arc::clone(&events),
            Arc::clone(&document),
        );

        Self {
            config: Arc::new(ConfigHandle::new(config)),
            storage,
            events,
            catalog,
            document,
            router,
            started: AtomicBool::new(false),
        }
    }

    /// Start at `fragment` (e.g. `#resources`) instead of an empty location.
    pub fn with_location(mut self, fragment: &str) -> Self {
        self.router = self.router.with_location(fragment);
        self
    }

    pub fn config(&self) -> Arc<SiteConfig> {
        self.config.get()
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn storage(&self) -> &Arc<PersistentStore> {
        &self.storage
    }

    // ========================================================================
    // startup
    // ========================================================================

    /// Run the startup sequence once. Later calls return immediately.
    pub async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.document.lock().show_loading();
        let result = self.run_startup().await;
        self.document.lock().hide_loading();

        if let Err(e) = &result {
            log!("error"; "startup failed: {:#}", e);
            self.document.lock().show_fatal(&format!("{e:#}"));
        }
        result
    }

    async fn run_startup(&self) -> Result<()> {
        self.apply_user_config();
        self.events.publish(&Event::ConfigReady);

        self.init_theme();
        self.subscribe_global();

        self.catalog.preload_core().await;
        self.events.publish(&Event::DataReady {
            resource_count: self.catalog.resource_count(),
            path_count: self.catalog.path_count(),
        });

        let config = self.config.get();
        self.router
            .initialize(config.routing.configured_pages())
            .await
            .context("failed to initialize router")?;

        debug!("app"; "started");
        Ok(())
    }

    fn apply_user_config(&self) {
        let overrides: UserConfig = self.storage.get(USER_CONFIG_KEY, UserConfig::default());
        if overrides.is_empty() {
            return;
        }
        let diag = self.config.update(|config| config.apply_overrides(&overrides));
        diag.print_warnings();
    }

    fn init_theme(&self) {
        let config = self.config.get();
        let stored: Option<String> = self.storage.get_opt(THEME_KEY);
        let theme = config
            .theme
            .resolve(stored.as_deref().unwrap_or(&config.theme.default));
        self.document.lock().set_theme(theme);
    }

    fn subscribe_global(&self) {
        let storage = Arc::clone(&self.storage);
        self.events.subscribe(EventKind::ThemeChange, move |event| {
            if let Event::ThemeChange { theme } = event {
                storage.set(THEME_KEY, theme)?;
                log!("app"; "theme switched to {}", theme);
            }
            Ok(())
        });

        let document = Arc::clone(&self.document);
        self.events.subscribe(EventKind::RouteChange, move |event| {
            if let Event::RouteChange { to, .. } = event {
                document.lock().scroll_to_top();
                debug!("app"; "navigated to {}", to);
            }
            Ok(())
        });

        let document = Arc::clone(&self.document);
        let languages = self.config.get().language.supported.len();
        self.events.subscribe(EventKind::DataReady, move |event| {
            if let Event::DataReady {
                resource_count,
                path_count,
            } = event
            {
                log!("data"; "{} resources, {} learning paths", resource_count, path_count);
                document.lock().set_stats(HomeStats {
                    resources: *resource_count,
                    paths: *path_count,
                    languages,
                });
            }
            Ok(())
        });
    }

    // ========================================================================
    // shell actions
    // ========================================================================

    pub fn theme(&self) -> String {
        self.document.lock().theme().to_string()
    }

    /// Apply `theme` (unavailable themes fall back to the configured
    /// default) and announce it. Returns the applied theme.
    pub fn set_theme(&self, theme: &str) -> String {
        let config = self.config.get();
        let applied = config.theme.resolve(theme).to_string();
        self.document.lock().set_theme(&applied);
        self.events.publish(&Event::ThemeChange {
            theme: applied.clone(),
        });
        applied
    }

    /// Switch to the next available theme.
    pub fn toggle_theme(&self) -> String {
        let config = self.config.get();
        let next = config.theme.next(&self.theme()).to_string();
        self.set_theme(&next)
    }

    /// Open or close the mobile navigation. Returns the new state.
    pub fn toggle_menu(&self) -> bool {
        self.document.lock().toggle_menu()
    }

    /// Persist theme, language and feature switches under `user_config`.
    pub fn save_user_config(&self) -> Result<(), StorageError> {
        let snapshot = UserConfig::capture(&self.config.get(), &self.theme());
        self.storage.set(USER_CONFIG_KEY, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::MemorySource;
    use crate::router::RouterState;
    use parking_lot::Mutex;
    use serde_json::json;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_json(
                "/data/categories/basic_sciences.json",
                json!({"resources": [
                    {"id": "a1", "category": "basic_sciences", "rating": 4.0},
                    {"id": "a2", "category": "basic_sciences", "rating": 4.5},
                ]}),
            )
            .with_json(
                "/data/learning_paths.json",
                json!({"paths": [{"id": "p1", "targetAudience": ["student"], "duration": "3月"}]}),
            )
    }

    fn app_with(config: SiteConfig, storage: Arc<PersistentStore>) -> App {
        let catalog = Arc::new(CatalogStore::new(Arc::new(source())));
        App::new(config, storage, catalog)
    }

    fn app() -> App {
        app_with(SiteConfig::default(), Arc::new(PersistentStore::in_memory()))
    }

    #[tokio::test]
    async fn test_start_sequence() {
        let app = app();
        let order = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            EventKind::ConfigReady,
            EventKind::DataReady,
            EventKind::RouteChange,
        ] {
            let order = Arc::clone(&order);
            app.events().subscribe(kind, move |_| {
                order.lock().push(kind.name());
                Ok(())
            });
        }

        app.start().await.unwrap();

        assert_eq!(*order.lock(), ["configReady", "dataReady", "routeChange"]);
        assert_eq!(app.router().state(), RouterState::Ready);

        let doc = app.document().lock();
        assert!(!doc.is_loading());
        assert_eq!(doc.theme(), "light");
        assert_eq!(doc.scroll_resets(), 1);
        assert_eq!(
            doc.stats(),
            Some(HomeStats {
                resources: 2,
                paths: 1,
                languages: 2
            })
        );
    }

    #[tokio::test]
    async fn test_start_runs_once() {
        let app = app();
        app.start().await.unwrap();
        app.start().await.unwrap();
        assert_eq!(app.document().lock().scroll_resets(), 1);
    }

    #[tokio::test]
    async fn test_missing_core_data_is_not_fatal() {
        let catalog = Arc::new(CatalogStore::new(Arc::new(MemorySource::new())));
        let app = App::new(
            SiteConfig::default(),
            Arc::new(PersistentStore::in_memory()),
            catalog,
        );

        app.start().await.unwrap();
        let doc = app.document().lock();
        assert!(doc.fatal_message().is_none());
        assert_eq!(doc.stats().map(|s| s.resources), Some(0));
    }

    #[tokio::test]
    async fn test_router_failure_shows_fatal_view() {
        let mut config = SiteConfig::default();
        config
            .routing
            .pages
            .insert("about".into(), Default::default());
        let app = app_with(config, Arc::new(PersistentStore::in_memory()));

        let err = app.start().await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to initialize router"));

        let doc = app.document().lock();
        assert!(doc.fatal_message().is_some());
        assert!(!doc.is_loading());
        assert!(doc.to_html().contains("应用加载失败"));
    }

    #[tokio::test]
    async fn test_restores_persisted_theme_and_overrides() {
        let storage = Arc::new(PersistentStore::in_memory());
        storage.set(THEME_KEY, "dark").unwrap();
        storage
            .set(
                USER_CONFIG_KEY,
                &json!({"language": {"default": "en-US"}, "features": {"analytics": true}}),
            )
            .unwrap();

        let app = app_with(SiteConfig::default(), storage);
        app.start().await.unwrap();

        assert_eq!(app.theme(), "dark");
        let config = app.config();
        assert_eq!(config.language.default, "en-US");
        assert!(config.features.analytics);
    }

    #[tokio::test]
    async fn test_invalid_stored_theme_falls_back() {
        let storage = Arc::new(PersistentStore::in_memory());
        storage.set(THEME_KEY, "neon").unwrap();
        let app = app_with(SiteConfig::default(), storage);
        app.start().await.unwrap();
        assert_eq!(app.theme(), "light");
    }

    #[tokio::test]
    async fn test_toggle_theme_persists_and_announces() {
        let storage = Arc::new(PersistentStore::in_memory());
        let app = app_with(SiteConfig::default(), Arc::clone(&storage));
        app.start().await.unwrap();

        assert_eq!(app.toggle_theme(), "dark");
        assert_eq!(storage.get(THEME_KEY, String::new()), "dark");
        assert_eq!(app.toggle_theme(), "light");
        assert_eq!(storage.get(THEME_KEY, String::new()), "light");

        assert_eq!(app.set_theme("sepia"), "light");
    }

    #[tokio::test]
    async fn test_toggle_menu_and_navigation_closes_it() {
        let app = app();
        app.start().await.unwrap();

        assert!(app.toggle_menu());
        app.router().navigate("about", true).await.unwrap();
        assert!(!app.document().lock().is_menu_open());
        assert_eq!(app.document().lock().scroll_resets(), 2);
    }

    #[tokio::test]
    async fn test_save_user_config() {
        let storage = Arc::new(PersistentStore::in_memory());
        let app = app_with(SiteConfig::default(), Arc::clone(&storage));
        app.start().await.unwrap();
        app.set_theme("dark");

        app.save_user_config().unwrap();

        let saved: UserConfig = storage.get_opt(USER_CONFIG_KEY).unwrap();
        assert_eq!(
            saved.theme.and_then(|t| t.default).as_deref(),
            Some("dark")
        );
        assert_eq!(
            saved.language.and_then(|l| l.default).as_deref(),
            Some("zh-CN")
        );
    }
}
