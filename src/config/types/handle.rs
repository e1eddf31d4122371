//! Live config handle.
//!
//! Uses `arc-swap` for lock-free reads and atomic replacement, so readers
//! holding an old snapshot are never blocked by an override being applied.

use crate::config::SiteConfig;
use arc_swap::ArcSwap;
use std::sync::Arc;

#[derive(Debug)]
pub struct ConfigHandle {
    inner: ArcSwap<SiteConfig>,
}

impl ConfigHandle {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(config),
        }
    }

    /// Current snapshot.
    #[inline]
    pub fn get(&self) -> Arc<SiteConfig> {
        self.inner.load_full()
    }

    pub fn replace(&self, config: SiteConfig) {
        self.inner.store(Arc::new(config));
    }

    /// Apply `f` to a copy of the current config and publish the result.
    pub fn update<R>(&self, f: impl FnOnce(&mut SiteConfig) -> R) -> R {
        let mut next = (*self.get()).clone();
        let result = f(&mut next);
        self.replace(next);
        result
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(SiteConfig::default())
    }
}
