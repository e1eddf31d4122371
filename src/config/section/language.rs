//! `[language]` section configuration.

use serde::{Deserialize, Serialize};

use crate::config::FieldPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub default: String,
    pub supported: Vec<String>,
}

impl LanguageConfig {
    pub const DEFAULT: FieldPath = FieldPath::new("language.default");

    pub fn is_supported(&self, language: &str) -> bool {
        self.supported.iter().any(|l| l == language)
    }

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if !self.is_supported(&self.default) {
            diag.error_with_hint(
                Self::DEFAULT,
                format!("'{}' is not a supported language", self.default),
                format!("choose one of: {}", self.supported.join(", ")),
            );
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: "zh-CN".into(),
            supported: vec!["zh-CN".into(), "en-US".into()],
        }
    }
}
