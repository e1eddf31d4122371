//! `[routing]` section configuration.
//!
//! When no pages are configured the router registers its built-in table.
//!
//! # Example
//!
//! ```toml
//! [routing]
//! default_page = "home"
//!
//! [routing.pages.home]
//! title = "首页 - 医学学习指南"
//! description = "医学学习指南与桥梁项目首页"
//!
//! [routing.pages.resources]
//! title = "资源中心 - 医学学习指南"
//! description = "开源医学学习资源库"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::FieldPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Route shown for an empty fragment and used as the fallback.
    pub default_page: String,

    /// Route id → page metadata, in declaration order.
    pub pages: IndexMap<String, PageConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub title: String,
    pub description: String,
}

impl RoutingConfig {
    pub const DEFAULT_PAGE: FieldPath = FieldPath::new("routing.default_page");
    pub const PAGES: FieldPath = FieldPath::new("routing.pages");

    /// Configured pages, or `None` to use the built-in table.
    pub fn configured_pages(&self) -> Option<&IndexMap<String, PageConfig>> {
        (!self.pages.is_empty()).then_some(&self.pages)
    }

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if self.default_page.trim().is_empty() {
            diag.error(Self::DEFAULT_PAGE, "default page must not be empty");
        }

        // Navigation still works, but unknown routes have nowhere to go.
        if !self.pages.is_empty() && !self.pages.contains_key(&self.default_page) {
            diag.warn(
                Self::PAGES,
                format!("no page is registered for '{}'", self.default_page),
            );
        }

        for id in self.pages.keys() {
            if id.is_empty() || id.contains(['#', '/', ' ']) {
                diag.error(Self::PAGES, format!("invalid route id '{id}'"));
            }
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_page: "home".into(),
            pages: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_pages_keep_declaration_order() {
        let config = test_parse_config(
            "[routing.pages.home]\ntitle = \"Home\"\n\
             [routing.pages.about]\ntitle = \"About\"\ndescription = \"About us\"\n\
             [routing.pages.resources]\ntitle = \"Resources\"",
        );

        let pages = config.routing.configured_pages().unwrap();
        let ids: Vec<_> = pages.keys().map(String::as_str).collect();
        assert_eq!(ids, ["home", "about", "resources"]);
        assert_eq!(pages["about"].description, "About us");
        assert_eq!(pages["resources"].description, "");
    }

    #[test]
    fn test_no_pages_means_builtin_table() {
        let config = test_parse_config("");
        assert!(config.routing.configured_pages().is_none());
        assert_eq!(config.routing.default_page, "home");
    }

    #[test]
    fn test_invalid_route_id() {
        let config = test_parse_config("[routing.pages.\"a/b\"]\ntitle = \"x\"");
        let mut diag = ConfigDiagnostics::new();
        config.routing.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
