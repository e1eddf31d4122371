//! Pending loads shared between concurrent callers.

use super::LoadError;
use futures::future::{BoxFuture, Shared};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;

/// A load any number of callers can await; all see the same result.
pub type SharedLoad = Shared<BoxFuture<'static, Result<Arc<Value>, LoadError>>>;

/// Cache key → the one pending load for that key.
///
/// Every entry carries a ticket so that settling an old load can never
/// remove a newer one registered under the same key.
#[derive(Default)]
pub struct InFlight {
    entries: FxHashMap<String, (u64, SharedLoad)>,
    next_ticket: u64,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a ticket for a load about to be registered.
    pub fn next_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    pub fn get(&self, key: &str) -> Option<SharedLoad> {
        self.entries.get(key).map(|(_, load)| load.clone())
    }

    pub fn insert(&mut self, key: String, ticket: u64, load: SharedLoad) {
        self.entries.insert(key, (ticket, load));
    }

    /// Remove `key` if it is still held by `ticket`.
    pub fn settle(&mut self, key: &str, ticket: u64) -> bool {
        match self.entries.get(key) {
            Some((held, _)) if *held == ticket => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
