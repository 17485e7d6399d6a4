//! User settings persisted under the `settings` document key.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::constants::{DEFAULT_CACHE_EXPIRATION_HOURS, DEFAULT_DASHBOARD_URL};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Persisted user preferences.
///
/// Missing fields fall back to their defaults so older documents keep
/// loading after new settings are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Analyze pages automatically when a tab finishes loading
    pub auto_analyze: bool,
    /// Broadcast a security alert for `danger` verdicts
    pub notifications: bool,
    /// Lifetime of cached analyses, in hours
    pub cache_expiration_hours: u32,
    pub theme: Theme,
    pub dashboard_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_analyze: true,
            notifications: true,
            cache_expiration_hours: DEFAULT_CACHE_EXPIRATION_HOURS,
            theme: Theme::System,
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
        }
    }
}
