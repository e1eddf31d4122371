//! Time-limited cache of raw dataset payloads.

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Lifetime of a cached payload.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached payload and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<Value>,
    pub timestamp: Instant,
}

/// Payload cache with lazy expiry.
///
/// Entries are only checked when read: a stale entry is removed and
/// reported as a miss. Nothing sweeps the map in the background.
#[derive(Debug)]
pub struct PayloadCache {
    entries: FxHashMap<String, CacheEntry>,
    ttl: Duration,
}

impl PayloadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: FxHashMap::default(),
            ttl,
        }
    }

    /// Fresh payload for `key`, evicting it if it has expired.
    pub fn get(&mut self, key: &str, now: Instant) -> Option<Arc<Value>> {
        let entry = self.entries.get(key)?;
        if now.saturating_duration_since(entry.timestamp) < self.ttl {
            return Some(Arc::clone(&entry.data));
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: impl Into<String>, data: Arc<Value>, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                data,
                timestamp: now,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PayloadCache {
    fn default() -> Self {
        Self::new(CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_entry_is_shared() {
        let mut cache = PayloadCache::default();
        let now = Instant::now();
        let data = Arc::new(json!({"resources": []}));
        cache.insert("data_x", Arc::clone(&data), now);

        let hit = cache.get("data_x", now + Duration::from_secs(10)).unwrap();
        assert!(Arc::ptr_eq(&hit, &data));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let mut cache = PayloadCache::default();
        let now = Instant::now();
        cache.insert("data_x", Arc::new(json!(1)), now);

        // exactly at the TTL boundary counts as expired
        assert!(cache.get("data_x", now + CACHE_TTL).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites_key() {
        let mut cache = PayloadCache::default();
        let now = Instant::now();
        cache.insert("data_x", Arc::new(json!(1)), now);
        cache.insert("data_x", Arc::new(json!(2)), now);

        assert_eq!(cache.len(), 1);
        assert_eq!(*cache.get("data_x", now).unwrap(), json!(2));
    }

    #[test]
    fn test_clear() {
        let mut cache = PayloadCache::default();
        let now = Instant::now();
        cache.insert("a", Arc::new(json!(1)), now);
        cache.insert("b", Arc::new(json!(2)), now);
        cache.clear();
        assert!(cache.get("a", now).is_none());
        assert_eq!(cache.len(), 0);
    }
}
