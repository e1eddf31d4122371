//! Route descriptors and the registration table.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;

use super::error::RenderError;
use super::pages::entry_for;
use crate::catalog::CatalogStore;
use crate::config::PageConfig;

/// Async page body producer, bound to one route at registration.
pub type Producer = Arc<dyn Fn() -> BoxFuture<'static, Result<String, RenderError>> + Send + Sync>;

/// Built-in table used when the config declares no pages.
pub const FALLBACK_ROUTES: [(&str, &str, &str); 5] = [
    ("home", "首页 - 医学学习指南", "医学学习指南与桥梁项目首页"),
    ("learning-paths", "学习路径 - 医学学习指南", "个性化医学学习路径规划"),
    ("resources", "资源中心 - 医学学习指南", "开源医学学习资源库"),
    ("career-guide", "职业规划 - 医学学习指南", "中美医学职业发展规划"),
    ("about", "关于项目 - 医学学习指南", "关于医学学习指南项目的信息"),
];

#[derive(Clone)]
pub struct RouteEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    producer: Producer,
}

impl RouteEntry {
    pub fn new<F>(id: &str, title: &str, description: &str, producer: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<String, RenderError>> + Send + Sync + 'static,
    {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            producer: Arc::new(producer),
        }
    }

    /// Run the producer.
    pub async fn produce(&self) -> Result<String, RenderError> {
        (self.producer)().await
    }

    /// Navigation label: the title up to ` - `.
    pub fn label(&self) -> &str {
        self.title
            .split_once(" - ")
            .map_or(self.title.as_str(), |(label, _)| label)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Registered routes in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: IndexMap<String, RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes from `pages`, or the built-in table when `None`.
    ///
    /// Every entry gets the producer registered for its id.
    pub fn build(pages: Option<&IndexMap<String, PageConfig>>, catalog: &Arc<CatalogStore>) -> Self {
        let mut table = Self::new();
        match pages {
            Some(pages) => {
                for (id, page) in pages {
                    table.insert(entry_for(id, &page.title, &page.description, catalog));
                }
            }
            None => {
                for (id, title, description) in FALLBACK_ROUTES {
                    table.insert(entry_for(id, title, description, catalog));
                }
            }
        }
        table
    }

    /// Register `entry`, replacing any route with the same id.
    pub fn insert(&mut self, entry: RouteEntry) -> Option<RouteEntry> {
        self.entries.insert(entry.id.clone(), entry)
    }

    pub fn get(&self, id: &str) -> Option<&RouteEntry> {
        self.entries.get(id)
    }

    /// `id` if registered, else `home`.
    pub fn resolve(&self, id: &str, home: &str) -> Option<&RouteEntry> {
        self.entries.get(id).or_else(|| self.entries.get(home))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::MemorySource;
    use futures::FutureExt;

    fn catalog() -> Arc<CatalogStore> {
        Arc::new(CatalogStore::new(Arc::new(MemorySource::new())))
    }

    #[test]
    fn test_fallback_table() {
        let table = RouteTable::build(None, &catalog());
        let ids: Vec<_> = table.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            ["home", "learning-paths", "resources", "career-guide", "about"]
        );
        assert_eq!(table.get("about").unwrap().title, "关于项目 - 医学学习指南");
        assert_eq!(table.get("resources").unwrap().label(), "资源中心");
    }

    #[test]
    fn test_configured_pages_replace_fallback() {
        let mut pages = IndexMap::new();
        pages.insert(
            "home".to_string(),
            PageConfig {
                title: "Home".into(),
                description: String::new(),
            },
        );
        let table = RouteTable::build(Some(&pages), &catalog());
        assert_eq!(table.len(), 1);
        assert!(table.get("about").is_none());
        assert_eq!(table.get("home").unwrap().label(), "Home");
    }

    #[test]
    fn test_resolve_falls_back_to_home() {
        let table = RouteTable::build(None, &catalog());
        assert_eq!(table.resolve("nope", "home").unwrap().id, "home");
        assert_eq!(table.resolve("about", "home").unwrap().id, "about");
        assert!(RouteTable::new().resolve("nope", "home").is_none());
    }

    #[tokio::test]
    async fn test_custom_producer() {
        let entry = RouteEntry::new("x", "X", "", || {
            async { Ok(String::from("<p>x</p>")) }.boxed()
        });
        assert_eq!(entry.produce().await.unwrap(), "<p>x</p>");
    }
}
