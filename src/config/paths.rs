//! Path management for Teamsheet
//!
//! Provides XDG-compliant path resolution for settings, the audit log and
//! the attendance confirmation store.
//!
//! ## Path Resolution Order
//!
//! 1. `TEAMSHEET_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/teamsheet` or `~/.config/teamsheet`
//! 3. Windows: `%APPDATA%\teamsheet`

use std::path::PathBuf;

use crate::error::TeamsheetError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "TEAMSHEET_DATA_DIR";

/// Manages all paths used by Teamsheet
#[derive(Debug, Clone)]
pub struct TeamsheetPaths {
    base_dir: PathBuf,
}

impl TeamsheetPaths {
    /// Create a new TeamsheetPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, TeamsheetError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create TeamsheetPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/teamsheet/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the append-only audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to confirmations.json (recorded attendance)
    pub fn confirmations_file(&self) -> PathBuf {
        self.data_dir().join("confirmations.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), TeamsheetError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TeamsheetError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TeamsheetError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, TeamsheetError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                TeamsheetError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("teamsheet"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, TeamsheetError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| TeamsheetError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("teamsheet"))
}
