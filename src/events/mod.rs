//! Synchronous application events.
//!
//! Handlers are called in registration order on the publishing thread.
//! A handler that returns `Err` is logged and skipped; the remaining
//! handlers still run. Handlers must not panic.
//!
//! ```ignore
//! let bus = EventBus::new();
//! bus.subscribe(EventKind::RouteChange, |event| {
//!     if let Event::RouteChange { to, .. } = event {
//!         log!("app"; "navigated to {}", to);
//!     }
//!     Ok(())
//! });
//! bus.publish(&Event::RouteChange { from: None, to: "home".into() });
//! ```

use crate::log;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// Everything the application announces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// User overrides have been applied to the live config.
    ConfigReady,
    /// Core datasets finished preloading (successfully or not).
    #[serde(rename_all = "camelCase")]
    DataReady {
        resource_count: usize,
        path_count: usize,
    },
    ThemeChange { theme: String },
    /// A navigation activated a new page.
    RouteChange { from: Option<String>, to: String },
}

impl Event {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ConfigReady => EventKind::ConfigReady,
            Self::DataReady { .. } => EventKind::DataReady,
            Self::ThemeChange { .. } => EventKind::ThemeChange,
            Self::RouteChange { .. } => EventKind::RouteChange,
        }
    }
}

/// Subscription topic, one per [`Event`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConfigReady,
    DataReady,
    ThemeChange,
    RouteChange,
}

impl EventKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConfigReady => "configReady",
            Self::DataReady => "dataReady",
            Self::ThemeChange => "themeChange",
            Self::RouteChange => "routeChange",
        }
    }
}

type Handler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    handlers: FxHashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

/// Publish/subscribe hub shared by the app, router and shell.
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut registry = self.registry.write();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was already gone.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut registry = self.registry.write();
        let Some(handlers) = registry.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(held, _)| *held != id);
        handlers.len() != before
    }

    /// Deliver `event` to every handler of its kind.
    ///
    /// Returns the number of handlers that completed without error.
    pub fn publish(&self, event: &Event) -> usize {
        let kind = event.kind();
        // Snapshot so handlers may subscribe or publish themselves.
        let handlers: Vec<Handler> = self
            .registry
            .read()
            .handlers
            .get(&kind)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        let mut delivered = 0;
        for handler in handlers {
            match handler(event) {
                Ok(()) => delivered += 1,
                Err(e) => log!("error"; "{} handler failed: {:#}", kind.name(), e),
            }
        }
        delivered
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.registry
            .read()
            .handlers
            .get(&kind)
            .map_or(0, Vec::len)
    }
}
