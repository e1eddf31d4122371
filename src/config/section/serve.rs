//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 3000                 # HTTP port number
//! index = "src/pages/index.html"
//! fallback = ["src/assets", "public", "src/pages", "scripts", "docs", "config"]
//!
//! [[serve.mappings]]
//! prefix = "/assets/"
//! dir = "src/assets"
//! ```
//!
//! Mappings are tried in order; the first prefix that matches decides the
//! directory. Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::FieldPath;

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number. The next free port is used when taken.
    pub port: u16,

    /// File served for `/` and `/index.html`.
    pub index: PathBuf,

    /// URL prefix → directory, first match wins.
    pub mappings: Vec<StaticMapping>,

    /// Directories searched when the mapped path does not exist.
    pub fallback: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticMapping {
    pub prefix: String,
    pub dir: PathBuf,
}

impl StaticMapping {
    pub fn new(prefix: &str, dir: &str) -> Self {
        Self {
            prefix: prefix.into(),
            dir: dir.into(),
        }
    }
}

impl ServeConfig {
    pub const MAPPINGS: FieldPath = FieldPath::new("serve.mappings");

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        for mapping in &self.mappings {
            if !mapping.prefix.starts_with('/') || !mapping.prefix.ends_with('/') {
                diag.error_with_hint(
                    Self::MAPPINGS,
                    format!("prefix '{}' must start and end with '/'", mapping.prefix),
                    "e.g. prefix = \"/assets/\"",
                );
            }
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            index: PathBuf::from("src/pages/index.html"),
            mappings: vec![
                StaticMapping::new("/assets/", "src/assets"),
                StaticMapping::new("/data/", "public/data"),
                StaticMapping::new("/", "src/pages"),
            ],
            fallback: ["src/assets", "public", "src/pages", "scripts", "docs", "config"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}
