//! Resource catalog backed by JSON datasets.
//!
//! # Module Structure
//!
//! ```text
//! catalog/
//! ├── model      # Resource, LearningPath, UserProfile
//! ├── filter     # ResourceFilter, SearchQuery
//! ├── source     # DataSource, FsSource, HttpSource
//! ├── cache      # PayloadCache (5 minute TTL)
//! ├── inflight   # pending loads shared by concurrent callers
//! ├── store      # CatalogStore
//! └── error      # LoadError
//! ```
//!
//! # Loading
//!
//! `CatalogStore::load("category_<name>")` reads
//! `/data/categories/<name>.json` and merges its `resources`;
//! any other name reads `/data/<name>.json` (`learning_paths` merges
//! `paths`, `user_profiles` merges `profiles`). Raw payloads are cached for
//! five minutes and concurrent loads of the same dataset share one fetch.

mod cache;
mod error;
mod filter;
mod inflight;
mod model;
mod source;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::CACHE_TTL;
pub use error::LoadError;
pub use filter::{ResourceFilter, SearchQuery};
pub use model::{LearningPath, Resource, UserProfile, parse_months};
pub use source::{DataSource, FsSource, HttpSource, dataset_path};
pub use store::{CORE_DATASETS, CatalogStore, LEARNING_PATHS, USER_PROFILES, cache_key};
