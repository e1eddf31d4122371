//! In-memory data source for tests.

use super::{DataSource, LoadError};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Serves canned bodies and counts every fetch per path.
///
/// Each fetch yields to the scheduler once before answering, so two loads
/// started together are both pending before either finishes.
#[derive(Default)]
pub struct MemorySource {
    bodies: Mutex<FxHashMap<String, Vec<u8>>>,
    fetches: Mutex<FxHashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, path: &str, value: Value) -> Self {
        self.set_json(path, value);
        self
    }

    pub fn set_json(&self, path: &str, value: Value) {
        self.set_raw(path, value.to_string().into_bytes());
    }

    pub fn set_raw(&self, path: &str, body: Vec<u8>) {
        self.bodies.lock().insert(path.to_string(), body);
    }

    pub fn remove(&self, path: &str) {
        self.bodies.lock().remove(path);
    }

    pub fn fetches(&self, path: &str) -> usize {
        self.fetches.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().values().sum()
    }
}

impl DataSource for MemorySource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LoadError>> {
        Box::pin(async move {
            *self.fetches.lock().entry(path.to_string()).or_default() += 1;
            tokio::task::yield_now().await;
            self.bodies
                .lock()
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::not_found(path))
        })
    }
}
