//! `[features]` section configuration.

use serde::{Deserialize, Serialize};

/// Feature switches. Persisted with the user overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub dark_mode: bool,
    pub offline_support: bool,
    pub progress_tracking: bool,
    pub social_sharing: bool,
    pub analytics: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            offline_support: false,
            progress_tracking: true,
            social_sharing: true,
            analytics: false,
        }
    }
}
