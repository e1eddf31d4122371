//! `[data]` section configuration.
//!
//! Datasets are read from `<root>/data/...` on disk, or fetched from
//! `<base_url>/data/...` when a base URL is set.
//!
//! # Example
//!
//! ```toml
//! [data]
//! root = "public"
//! base_url = "https://example.github.io/medical-learning-guide/"
//! core = ["category_basic_sciences", "category_usmle_prep", "learning_paths"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::CORE_DATASETS;
use crate::config::FieldPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Static root holding the `data/` directory.
    pub root: PathBuf,

    /// Remote site to fetch datasets from instead of `root`.
    pub base_url: Option<String>,

    /// Datasets loaded at startup.
    pub core: Vec<String>,
}

impl DataConfig {
    pub const BASE_URL: FieldPath = FieldPath::new("data.base_url");
    pub const CORE: FieldPath = FieldPath::new("data.core");

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if let Some(base) = &self.base_url {
            match url::Url::parse(base) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => diag.error_with_hint(
                    Self::BASE_URL,
                    format!("scheme '{}' not supported", parsed.scheme()),
                    "use format like https://example.com/",
                ),
                Err(e) => diag.error_with_hint(
                    Self::BASE_URL,
                    format!("invalid URL: {e}"),
                    "use format like https://example.com/",
                ),
            }
        }

        if self.core.iter().any(|name| name.trim().is_empty()) {
            diag.error(Self::CORE, "dataset names must not be empty");
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            base_url: None,
            core: CORE_DATASETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
