//! Site configuration management for `mlg.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── app        # [app]
//! │   ├── data       # [data]
//! │   ├── features   # [features]
//! │   ├── language   # [language]
//! │   ├── routing    # [routing], [routing.pages.<id>]
//! │   ├── serve      # [serve], [[serve.mappings]]
//! │   └── theme      # [theme]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # ConfigHandle
//! ├── overrides      # UserConfig (persisted user overrides)
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! A missing `mlg.toml` is not an error: every section has defaults and
//! the router falls back to its built-in route table.

mod overrides;
pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use overrides::{
    FeatureOverrides, LanguageOverride, ThemeOverride, USER_CONFIG_KEY, UserConfig,
};
pub use section::{
    AppConfig, DataConfig, FeaturesConfig, LanguageConfig, PageConfig, RoutingConfig,
    ServeConfig, StaticMapping, ThemeConfig,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, ConfigHandle, FieldPath};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing mlg.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub language: LanguageConfig,

    #[serde(default)]
    pub features: FeaturesConfig,

    #[serde(default)]
    pub data: DataConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory, or cwd when there is no file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_command_options(cli);
        config.validate()?;
        config.normalize_paths();
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the site root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        if let Some(data) = cli.data_args()
            && data.base_url.is_some()
        {
            self.data.base_url = data.base_url.clone();
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every configured path against the project root.
    pub(crate) fn normalize_paths(&mut self) {
        let root = crate::utils::path::normalize_path(&self.root);

        self.data.root = root.join(&self.data.root);
        self.app.storage = Self::expand_path(&self.app.storage, &root);
        self.serve.index = root.join(&self.serve.index);
        for mapping in &mut self.serve.mappings {
            mapping.dir = root.join(&mapping.dir);
        }
        for dir in &mut self.serve.fallback {
            *dir = root.join(&*dir);
        }

        self.root = root;
    }

    /// Expand `~` and resolve relative paths against `root`.
    fn expand_path(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path.to_str().unwrap_or_default()).into_owned();
        let path = PathBuf::from(expanded);
        if path.is_relative() {
            root.join(path)
        } else {
            path
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.app.validate(&mut diag);
        self.routing.validate(&mut diag);
        self.theme.validate(&mut diag);
        self.language.validate(&mut diag);
        self.data.validate(&mut diag);
        self.serve.validate(&mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<SiteConfig, _> = toml::from_str("[app\nname = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.theme.default, "light");
        assert_eq!(config.language.default, "zh-CN");
        assert!(config.features.dark_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[app]\nname = \"Test\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.app.name, "Test");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[theme]\ndefault = \"dark\"\n[routing.pages.home]\ntitle = \"Home\"";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = test_parse_config(
            "[theme]\ndefault = \"neon\"\n[language]\ndefault = \"fr\"\n[data]\nbase_url = \"x\"",
        );
        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_command_options_override_file() {
        let cli = Cli::parse_from(["mlg", "serve", "-i", "0.0.0.0", "-p", "8080"]);
        let mut config = test_parse_config("[serve]\nport = 3000");
        config.apply_command_options(&cli);
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.interface, IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let cli = Cli::parse_from(["mlg", "categories", "--base-url", "https://a.example/"]);
        let mut config = test_parse_config("[data]\nbase_url = \"https://b.example/\"");
        config.apply_command_options(&cli);
        assert_eq!(config.data.base_url.as_deref(), Some("https://a.example/"));
    }

    #[test]
    fn test_normalize_paths_joins_root() {
        let mut config = test_parse_config("[data]\nroot = \"site\"");
        config.root = PathBuf::from("/nonexistent/project");
        config.normalize_paths();

        assert_eq!(config.data.root, Path::new("/nonexistent/project/site"));
        assert_eq!(
            config.serve.mappings[1].dir,
            Path::new("/nonexistent/project/public/data")
        );
        assert_eq!(
            config.app.storage,
            Path::new("/nonexistent/project/.mlg/storage.json")
        );
    }

    #[test]
    fn test_root_relative() {
        let config = SiteConfig {
            root: PathBuf::from("/p"),
            ..SiteConfig::default()
        };
        assert_eq!(config.root_relative("/p/src/pages"), Path::new("src/pages"));
        assert_eq!(config.root_relative("/other"), Path::new("/other"));
    }
}
