//! Application settings.
//!
//! Settings are persisted as a JSON file owned by the host application.
//! Missing or unreadable files fall back to defaults.

use crate::error::AppError;
use crate::services::identity::DEFAULT_PARTITION_THRESHOLD;
use crate::services::notification_client::ApiConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings filename inside the host's config directory.
pub const SETTINGS_FILE: &str = "notifications.json";

/// Default number of entries shown in the bell dropdown.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Store behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Ids below this are persisted; ids at or above are provisional.
    pub partition_threshold: i64,

    /// Entries shown by the bell icon.
    pub recent_limit: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            partition_threshold: DEFAULT_PARTITION_THRESHOLD,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Notification API connection.
    pub api: ApiConfig,

    /// Store configuration.
    pub store: StoreSettings,
}

impl AppSettings {
    /// Reject values the store cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.store.partition_threshold <= 0 {
            return Err(AppError::invalid_input_field(
                "Partition threshold must be positive",
                "store.partition_threshold",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::invalid_input_field(
                "Timeout must be at least one second",
                "api.timeout_secs",
            ));
        }
        Ok(())
    }
}

/// Load settings from disk, using defaults if not found.
pub fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppSettings::default()),
        Err(e) => {
            return Err(AppError::internal(format!(
                "Failed to read settings {}: {}",
                path.display(),
                e
            )))
        }
    };

    let settings = serde_json::from_str(&contents).unwrap_or_else(|e| {
        log::warn!(
            "[settings] Ignoring unreadable settings in {}: {}",
            path.display(),
            e
        );
        AppSettings::default()
    });

    Ok(settings)
}

/// Save settings to disk.
pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    settings.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::internal(format!("Failed to create settings dir: {}", e)))?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)
        .map_err(|e| AppError::internal(format!("Failed to save settings: {}", e)))?;

    Ok(())
}
