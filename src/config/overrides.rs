//! Persisted user overrides (`user_config` in storage).
//!
//! Overrides are applied to the loaded config one field at a time; a value
//! that fails validation is skipped with a warning and the rest still apply.
//!
//! Stored shape:
//!
//! ```json
//! {
//!   "theme": { "default": "dark", "autoDetect": false },
//!   "language": { "default": "en-US" },
//!   "features": { "analytics": true }
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::{ConfigDiagnostics, FeaturesConfig, LanguageConfig, SiteConfig, ThemeConfig};

/// Storage key holding the overrides.
pub const USER_CONFIG_KEY: &str = "user_config";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeOverride {
    #[serde(alias = "defaultTheme", skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_detect: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureOverrides {
    pub dark_mode: Option<bool>,
    pub offline_support: Option<bool>,
    pub progress_tracking: Option<bool>,
    pub social_sharing: Option<bool>,
    pub analytics: Option<bool>,
}

impl UserConfig {
    /// Snapshot of the user-adjustable parts of `config`.
    ///
    /// `theme` is the theme currently shown, saved as the new default.
    pub fn capture(config: &SiteConfig, theme: &str) -> Self {
        let f = &config.features;
        Self {
            theme: Some(ThemeOverride {
                default: Some(theme.to_string()),
                auto_detect: Some(config.theme.auto_detect),
            }),
            language: Some(LanguageOverride {
                default: Some(config.language.default.clone()),
            }),
            features: Some(FeatureOverrides {
                dark_mode: Some(f.dark_mode),
                offline_support: Some(f.offline_support),
                progress_tracking: Some(f.progress_tracking),
                social_sharing: Some(f.social_sharing),
                analytics: Some(f.analytics),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl SiteConfig {
    /// Apply user overrides field by field.
    ///
    /// Rejected values are reported as warnings in the returned diagnostics.
    pub fn apply_overrides(&mut self, overrides: &UserConfig) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();

        if let Some(theme) = &overrides.theme {
            if let Some(default) = &theme.default {
                if self.theme.is_available(default) {
                    self.theme.default = default.clone();
                } else {
                    diag.warn(
                        ThemeConfig::DEFAULT,
                        format!("ignoring unavailable theme '{default}'"),
                    );
                }
            }
            if let Some(auto_detect) = theme.auto_detect {
                self.theme.auto_detect = auto_detect;
            }
        }

        if let Some(default) = overrides.language.as_ref().and_then(|l| l.default.as_ref()) {
            if self.language.is_supported(default) {
                self.language.default = default.clone();
            } else {
                diag.warn(
                    LanguageConfig::DEFAULT,
                    format!("ignoring unsupported language '{default}'"),
                );
            }
        }

        if let Some(features) = &overrides.features {
            apply_features(&mut self.features, features);
        }

        diag
    }
}

fn apply_features(target: &mut FeaturesConfig, overrides: &FeatureOverrides) {
    let fields = [
        (&mut target.dark_mode, overrides.dark_mode),
        (&mut target.offline_support, overrides.offline_support),
        (&mut target.progress_tracking, overrides.progress_tracking),
        (&mut target.social_sharing, overrides.social_sharing),
        (&mut target.analytics, overrides.analytics),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            *field = value;
        }
    }
}
