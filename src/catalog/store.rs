//! The catalog store: loading, caching and querying.

use super::cache::PayloadCache;
use super::filter::{ResourceFilter, SearchQuery};
use super::inflight::{InFlight, SharedLoad};
use super::model::{LearningPath, Resource, UserProfile};
use super::source::{CATEGORY_PREFIX, DataSource, dataset_path};
use super::LoadError;
use crate::{debug, log};
use futures::FutureExt;
use indexmap::{IndexMap, IndexSet};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

/// Datasets loaded before the router starts.
pub const CORE_DATASETS: [&str; 3] = [
    "category_basic_sciences",
    "category_usmle_prep",
    "learning_paths",
];

/// Named dataset holding learning paths.
pub const LEARNING_PATHS: &str = "learning_paths";

/// Named dataset holding user profiles.
pub const USER_PROFILES: &str = "user_profiles";

/// Cache key for a dataset name.
pub fn cache_key(category: &str) -> String {
    format!("data_{category}")
}

/// Cache and pending loads, guarded together so a lookup and the
/// registration of a new load happen in one critical section.
struct LoadState {
    cache: PayloadCache,
    in_flight: InFlight,
}

/// Loaded records, keyed by id.
///
/// Maps keep first-insertion order, which is the tie-break for every
/// sorted query.
#[derive(Default)]
struct Collections {
    resources: IndexMap<String, Arc<Resource>>,
    paths: IndexMap<String, Arc<LearningPath>>,
    profiles: IndexMap<String, Arc<UserProfile>>,
}

impl Collections {
    /// Merge a payload into the collections. Returns the number of records.
    fn merge(&mut self, category: &str, payload: &Value) -> usize {
        if category.starts_with(CATEGORY_PREFIX) {
            merge_records(&mut self.resources, payload, "resources", |r: &Resource| {
                r.id.clone()
            })
        } else if category == LEARNING_PATHS {
            merge_records(&mut self.paths, payload, "paths", |p: &LearningPath| {
                p.id.clone()
            })
        } else if category == USER_PROFILES {
            merge_records(&mut self.profiles, payload, "profiles", |p: &UserProfile| {
                p.user_id.clone()
            })
        } else {
            0
        }
    }
}

/// Insert every decodable record of `payload[field]`, overwriting by id.
fn merge_records<T: DeserializeOwned>(
    map: &mut IndexMap<String, Arc<T>>,
    payload: &Value,
    field: &str,
    id_of: impl Fn(&T) -> String,
) -> usize {
    let Some(records) = payload.get(field).and_then(Value::as_array) else {
        return 0;
    };

    let mut merged = 0;
    for record in records {
        match T::deserialize(record) {
            Ok(item) => {
                map.insert(id_of(&item), Arc::new(item));
                merged += 1;
            }
            Err(e) => debug!("data"; "skipping malformed {} entry: {}", field, e),
        }
    }
    merged
}

/// Removes a settled load from the in-flight map, however the load ends.
struct SettleGuard {
    state: Arc<Mutex<LoadState>>,
    key: String,
    ticket: u64,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        self.state.lock().in_flight.settle(&self.key, self.ticket);
    }
}

/// In-memory catalog of resources, learning paths and profiles.
pub struct CatalogStore {
    source: Arc<dyn DataSource>,
    state: Arc<Mutex<LoadState>>,
    collections: Arc<RwLock<Collections>>,
    core_datasets: Vec<String>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(LoadState {
                cache: PayloadCache::default(),
                in_flight: InFlight::new(),
            })),
            collections: Arc::new(RwLock::new(Collections::default())),
            core_datasets: CORE_DATASETS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the datasets `preload_core` loads.
    pub fn with_core_datasets(mut self, datasets: Vec<String>) -> Self {
        self.core_datasets = datasets;
        self
    }

    // ========================================================================
    // loading
    // ========================================================================

    /// Load a dataset, serving a fresh cached payload when possible.
    ///
    /// Concurrent calls for the same dataset share one fetch. A failed load
    /// is not cached; calling again retries.
    pub async fn load(&self, category: &str, force_reload: bool) -> Result<Arc<Value>, LoadError> {
        let key = cache_key(category);

        let pending = {
            let mut state = self.state.lock();
            let cached = state.cache.get(&key, Instant::now());
            if let Some(data) = cached
                && !force_reload
            {
                debug!("data"; "cache hit: {}", category);
                return Ok(data);
            }

            match state.in_flight.get(&key) {
                Some(pending) => {
                    debug!("data"; "joining pending load: {}", category);
                    pending
                }
                None => {
                    let ticket = state.in_flight.next_ticket();
                    let pending = self.start_load(category, &key, ticket);
                    state.in_flight.insert(key, ticket, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn start_load(&self, category: &str, key: &str, ticket: u64) -> SharedLoad {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let collections = Arc::clone(&self.collections);
        let category = category.to_string();
        let key = key.to_string();

        async move {
            let _settle = SettleGuard {
                state: Arc::clone(&state),
                key: key.clone(),
                ticket,
            };

            let path = dataset_path(&category);
            debug!("data"; "fetching {}", path);

            match fetch_json(source.as_ref(), &path).await {
                Ok(payload) => {
                    let payload = Arc::new(payload);
                    let merged = collections.write().merge(&category, &payload);
                    state
                        .lock()
                        .cache
                        .insert(key, Arc::clone(&payload), Instant::now());
                    log!("data"; "loaded {} ({} records)", category, merged);
                    Ok(payload)
                }
                Err(e) => {
                    log!("error"; "failed to load {}: {}", category, e);
                    Err(e)
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Load the core datasets concurrently. Failures are logged, not returned.
    pub async fn preload_core(&self) {
        let loads = self.core_datasets.iter().map(|name| self.load(name, false));
        let results = futures::future::join_all(loads).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed == 0 {
            log!("data"; "core data ready");
        } else {
            log!("warning"; "core data preload incomplete ({} of {} failed)", failed, results.len());
        }
    }

    /// Drop all cached payloads. Loaded records stay.
    pub fn clear_cache(&self) {
        self.state.lock().cache.clear();
        debug!("data"; "cache cleared");
    }

    /// Whether a load for `category` is currently pending.
    pub fn is_loading(&self, category: &str) -> bool {
        self.state.lock().in_flight.contains(&cache_key(category))
    }

    // ========================================================================
    // queries
    // ========================================================================

    /// Resources of one category, featured first, then by rating.
    pub fn resources_by_category(
        &self,
        category: &str,
        filter: &ResourceFilter,
    ) -> Vec<Arc<Resource>> {
        let collections = self.collections.read();
        let mut found: Vec<_> = collections
            .resources
            .values()
            .filter(|r| r.category == category && filter.matches(r))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| b.rating.total_cmp(&a.rating))
        });
        found
    }

    pub fn resource_by_id(&self, id: &str) -> Option<Arc<Resource>> {
        self.collections.read().resources.get(id).cloned()
    }

    pub fn learning_path(&self, id: &str) -> Option<Arc<LearningPath>> {
        self.collections.read().paths.get(id).cloned()
    }

    pub fn user_profile(&self, user_id: &str) -> Option<Arc<UserProfile>> {
        self.collections.read().profiles.get(user_id).cloned()
    }

    /// Paths aimed at `audience`, best recommendation first.
    pub fn recommended_paths(&self, audience: &str) -> Vec<Arc<LearningPath>> {
        let collections = self.collections.read();
        let mut found: Vec<_> = collections
            .paths
            .values()
            .filter(|p| p.targets(audience))
            .cloned()
            .collect();

        found.sort_by_key(|p| std::cmp::Reverse(p.score(audience)));
        found
    }

    /// Resources containing every query term, by rating only.
    ///
    /// Unlike category listings, featured resources get no boost here.
    pub fn search_resources(&self, query: &str, filter: &ResourceFilter) -> Vec<Arc<Resource>> {
        let query = SearchQuery::new(query);
        let collections = self.collections.read();
        let mut found: Vec<_> = collections
            .resources
            .values()
            .filter(|r| query.matches(r) && filter.matches(r))
            .cloned()
            .collect();

        found.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        found
    }

    /// Distinct categories of loaded resources, in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let collections = self.collections.read();
        let set: IndexSet<&str> = collections
            .resources
            .values()
            .map(|r| r.category.as_str())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Distinct non-empty subcategories within `category`.
    pub fn subcategories(&self, category: &str) -> Vec<String> {
        let collections = self.collections.read();
        let set: IndexSet<&str> = collections
            .resources
            .values()
            .filter(|r| r.category == category)
            .filter_map(|r| r.subcategory.as_deref())
            .filter(|s| !s.is_empty())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn resource_count(&self) -> usize {
        self.collections.read().resources.len()
    }

    pub fn path_count(&self) -> usize {
        self.collections.read().paths.len()
    }

    pub fn profile_count(&self) -> usize {
        self.collections.read().profiles.len()
    }
}

async fn fetch_json(source: &dyn DataSource, path: &str) -> Result<Value, LoadError> {
    let body = source.fetch(path).await?;
    serde_json::from_slice(&body).map_err(|e| LoadError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}
