//! Catalog query commands: `search`, `list`, `paths`, `categories`.
//!
//! Each command loads what it needs through a `CatalogStore` and prints
//! JSON to stdout. Datasets come from `[data] root` on disk, or from
//! `--base-url` over HTTP.

mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::catalog::{
    CatalogStore, DataSource, FsSource, HttpSource, LEARNING_PATHS, LearningPath, Resource,
    ResourceFilter,
};
use crate::config::SiteConfig;
use crate::debug;

pub use output::{print_json, print_records};

/// Catalog over the configured data source.
pub fn open_catalog(config: &SiteConfig) -> Result<Arc<CatalogStore>> {
    let source: Arc<dyn DataSource> = match &config.data.base_url {
        Some(base) => {
            debug!("data"; "fetching from {}", base);
            Arc::new(HttpSource::parse(base).with_context(|| format!("invalid base URL `{base}`"))?)
        }
        None => {
            debug!("data"; "reading from {}", config.data.root.display());
            Arc::new(FsSource::new(&config.data.root))
        }
    };
    Ok(Arc::new(
        CatalogStore::new(source).with_core_datasets(config.data.core.clone()),
    ))
}

/// Resources matching every term of `query`, best rated first.
pub async fn search(
    catalog: &CatalogStore,
    query: &str,
    filter: &ResourceFilter,
) -> Vec<Arc<Resource>> {
    catalog.preload_core().await;
    let found = catalog.search_resources(query, filter);
    debug!("data"; "{} resources match `{}`", found.len(), query);
    found
}

/// One category, featured first.
pub async fn list(
    catalog: &CatalogStore,
    category: &str,
    filter: &ResourceFilter,
) -> Result<Vec<Arc<Resource>>> {
    let dataset = format!("category_{category}");
    catalog
        .load(&dataset, false)
        .await
        .with_context(|| format!("failed to load category `{category}`"))?;
    Ok(catalog.resources_by_category(category, filter))
}

/// Recommended learning paths for `audience`.
pub async fn paths(catalog: &CatalogStore, audience: &str) -> Result<Vec<Arc<LearningPath>>> {
    catalog
        .load(LEARNING_PATHS, false)
        .await
        .context("failed to load learning paths")?;
    Ok(catalog.recommended_paths(audience))
}

/// Loaded categories with their subcategories, in first-seen order.
pub async fn categories(catalog: &CatalogStore) -> IndexMap<String, Vec<String>> {
    catalog.preload_core().await;
    catalog
        .categories()
        .into_iter()
        .map(|category| {
            let subcategories = catalog.subcategories(&category);
            (category, subcategories)
        })
        .collect()
}
