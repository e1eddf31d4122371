//! `[app]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [app]
//! name = "医学学习指南与桥梁"
//! version = "1.0.0"
//! storage = "~/.mlg/storage.json"   # Persisted theme and user overrides
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::FieldPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    pub repository: Option<String>,

    /// Key-value storage file, relative to the project root.
    pub storage: PathBuf,
}

impl AppConfig {
    pub const STORAGE: FieldPath = FieldPath::new("app.storage");
    pub const REPOSITORY: FieldPath = FieldPath::new("app.repository");

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if self.storage.as_os_str().is_empty() {
            diag.error(Self::STORAGE, "storage path must not be empty");
        }

        if let Some(repo) = &self.repository
            && url::Url::parse(repo).is_err()
        {
            diag.warn(Self::REPOSITORY, format!("'{repo}' is not a valid URL"));
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "医学学习指南与桥梁".into(),
            version: "1.0.0".into(),
            description: "为医学学习者提供的全面学习导航系统".into(),
            repository: None,
            storage: PathBuf::from(crate::storage::STORAGE_FILE),
        }
    }
}
