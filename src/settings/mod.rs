//! Persistent user settings
//!
//! Settings live in a JSON document under the XDG config directory
//! (`~/.config/meteopanel/settings.json` on Linux). Older documents are
//! migrated in place when they are loaded.

mod location;
pub mod migration;

pub use location::{Location, LocationError, LocationProvider, Place, SettingsLocationProvider};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::units::UnitPreferences;

/// Shortest allowed refresh interval in seconds (10 minutes)
pub const MIN_REFRESH_SECS: u64 = 600;

/// Longest allowed refresh interval in seconds (24 hours)
pub const MAX_REFRESH_SECS: u64 = 86_400;

/// Errors that can occur when loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed
    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings document is not valid
    #[error("Invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// User settings for locations, units, and panel behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Saved locations
    pub locations: Vec<Location>,
    /// Index into `locations` of the active location
    pub selected_location: usize,
    /// Display units
    pub units: UnitPreferences,
    /// Seconds between successful refreshes
    pub refresh_interval_current: u64,
    /// Extra forecast days after today (0-7)
    pub days_forecast: i32,
    /// Hide the hourly strip and the forecast days
    pub disable_forecast: bool,
    /// Show condition text; when off, condition text is left empty
    pub translate_condition: bool,
    /// Show the temperature in the panel line
    pub text_in_panel: bool,
    /// Show the condition in the panel line
    pub comment_in_panel: bool,
    /// Truncate the location name to this many characters (0 = no limit)
    pub location_name_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            selected_location: 0,
            units: UnitPreferences::default(),
            refresh_interval_current: MIN_REFRESH_SECS,
            days_forecast: 3,
            disable_forecast: false,
            translate_condition: true,
            text_in_panel: true,
            comment_in_panel: false,
            location_name_length: 0,
        }
    }
}

impl Settings {
    /// Default settings file path in the XDG config directory
    ///
    /// Returns `None` if the config directory cannot be determined (e.g., no home directory).
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "meteopanel")?;
        Some(project_dirs.config_dir().join("settings.json"))
    }

    /// Loads settings from `path`, migrating older documents
    ///
    /// A missing file yields the defaults. A migrated document is written
    /// back so the migration runs once.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let mut document: serde_json::Value = serde_json::from_str(&content)?;
        let migrated = migration::migrate(&mut document);
        let settings: Settings = serde_json::from_value(document)?;

        if migrated {
            info!(path = %path.display(), "Migrated settings from an older version");
            settings.save(path)?;
        }

        Ok(settings)
    }

    /// Writes settings to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// The selected location, if the index is in range
    pub fn active_location(&self) -> Option<&Location> {
        self.locations.get(self.selected_location)
    }

    /// Refresh interval clamped to 10 minutes .. 24 hours
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(
            self.refresh_interval_current
                .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS),
        )
    }
}
