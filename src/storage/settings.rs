//! Settings document load/save.

use super::documents::{DocumentStore, SETTINGS_KEY};
use crate::config::Settings;
use crate::error_handling::{ErrorType, PipelineStats, StorageError};

/// Loads the stored settings; a missing or unreadable document yields the
/// defaults.
pub async fn load_settings(store: &DocumentStore, stats: &PipelineStats) -> Settings {
    match store.get::<Settings>(SETTINGS_KEY).await {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            log::warn!("Failed to read settings, using defaults: {}", e);
            stats.increment_error(ErrorType::StorageReadError);
            Settings::default()
        }
    }
}

pub async fn save_settings(store: &DocumentStore, settings: &Settings) -> Result<(), StorageError> {
    store.set(SETTINGS_KEY, settings).await
}
