//! User settings for Teamsheet
//!
//! Manages the public base URL used in confirmation links, token validity,
//! and the name of the environment variable holding the shared secret.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::paths::TeamsheetPaths;
use crate::error::TeamsheetError;

/// Settings for Teamsheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Public origin that confirmation links point at
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the confirmation endpoint under `base_url`
    #[serde(default = "default_confirmation_path")]
    pub confirmation_path: String,

    /// How long an issued confirmation token stays valid
    #[serde(default = "default_token_validity_hours")]
    pub token_validity_hours: u32,

    /// Environment variable the signing secret is read from.
    /// Shared with API-key authentication, so rotating it invalidates all
    /// outstanding confirmation links.
    #[serde(default = "default_secret_env_var")]
    pub secret_env_var: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_confirmation_path() -> String {
    crate::token::DEFAULT_CONFIRMATION_PATH.to_string()
}

fn default_token_validity_hours() -> u32 {
    72
}

fn default_secret_env_var() -> String {
    crate::crypto::secret::DEFAULT_SECRET_ENV.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            base_url: default_base_url(),
            confirmation_path: default_confirmation_path(),
            token_validity_hours: default_token_validity_hours(),
            secret_env_var: default_secret_env_var(),
        }
    }
}

impl Settings {
    /// Token validity as a duration
    pub fn token_validity(&self) -> Duration {
        Duration::hours(i64::from(self.token_validity_hours))
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &TeamsheetPaths) -> Result<Self, TeamsheetError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                TeamsheetError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TeamsheetError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TeamsheetPaths) -> Result<(), TeamsheetError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            TeamsheetError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            TeamsheetError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
