//! `[theme]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [theme]
//! available = ["light", "dark"]
//! default = "light"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::FieldPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub available: Vec<String>,
    pub default: String,
    /// Follow the system color scheme when nothing is persisted.
    pub auto_detect: bool,
}

impl ThemeConfig {
    pub const DEFAULT: FieldPath = FieldPath::new("theme.default");
    pub const AVAILABLE: FieldPath = FieldPath::new("theme.available");

    pub fn is_available(&self, theme: &str) -> bool {
        self.available.iter().any(|t| t == theme)
    }

    /// `theme` if it is available, otherwise the configured default.
    pub fn resolve<'a>(&'a self, theme: &'a str) -> &'a str {
        if self.is_available(theme) {
            theme
        } else {
            &self.default
        }
    }

    /// The theme after `current` in `available`, wrapping around.
    pub fn next(&self, current: &str) -> &str {
        let position = self.available.iter().position(|t| t == current);
        match position {
            Some(i) => &self.available[(i + 1) % self.available.len()],
            None => &self.default,
        }
    }

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if self.available.is_empty() {
            diag.error(Self::AVAILABLE, "at least one theme is required");
            return;
        }
        if !self.is_available(&self.default) {
            diag.error_with_hint(
                Self::DEFAULT,
                format!("'{}' is not an available theme", self.default),
                format!("choose one of: {}", self.available.join(", ")),
            );
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            available: vec!["light".into(), "dark".into()],
            default: "light".into(),
            auto_detect: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_next_wraps() {
        let theme = ThemeConfig::default();
        assert_eq!(theme.next("light"), "dark");
        assert_eq!(theme.next("dark"), "light");
        assert_eq!(theme.next("sepia"), "light");
    }

    #[test]
    fn test_resolve_unknown_theme() {
        let theme = ThemeConfig::default();
        assert_eq!(theme.resolve("dark"), "dark");
        assert_eq!(theme.resolve("neon"), "light");
    }

    #[test]
    fn test_default_must_be_available() {
        let config = test_parse_config("[theme]\navailable = [\"dark\"]\ndefault = \"light\"");
        let mut diag = ConfigDiagnostics::new();
        config.theme.validate(&mut diag);
        assert_eq!(diag.len(), 1);

        let config = test_parse_config("[theme]\navailable = []");
        let mut diag = ConfigDiagnostics::new();
        config.theme.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
