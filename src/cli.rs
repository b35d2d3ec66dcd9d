//! Command-line interface parsing for meteopanel
//!
//! Arguments override the saved settings for one run without writing them
//! back: `--lat/--lon` pick an ad-hoc location, `--days` the forecast
//! horizon, and `--once` prints a text report instead of opening the UI.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::selection::MAX_EXTRA_DAYS;
use crate::settings::{Location, Settings};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid latitude: {0}. Latitude must be between -90 and 90")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0}. Longitude must be between -180 and 180")]
    InvalidLongitude(f64),

    #[error("Invalid forecast days: {0}. Choose between 0 and 7 extra days")]
    InvalidDays(i32),
}

/// meteopanel - Current weather, an hourly strip, and multi-day forecasts
#[derive(Parser, Debug)]
#[command(name = "meteopanel")]
#[command(about = "Weather panel for the terminal, powered by Open-Meteo")]
#[command(version)]
pub struct Cli {
    /// Latitude of a location to show instead of the saved one
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of a location to show instead of the saved one
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Extra forecast days after today (0-7)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub days: Option<i32>,

    /// Print a text report and exit instead of opening the interface
    #[arg(long)]
    pub once: bool,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupConfig {
    /// Location replacing the saved locations for this run
    pub location_override: Option<Location>,
    /// Forecast horizon replacing the saved one
    pub days_override: Option<i32>,
    /// Print once and exit
    pub once: bool,
    /// Explicit settings file
    pub settings_path: Option<PathBuf>,
}

impl StartupConfig {
    /// Validates parsed CLI arguments into a StartupConfig
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the requested overrides
    /// * `Err(CliError)` if a coordinate or the day count is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let location_override = match (cli.lat, cli.lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(CliError::InvalidLatitude(lat));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(CliError::InvalidLongitude(lon));
                }
                Some(Location::coordinates(lat, lon, None))
            }
            // clap enforces that both are given together
            _ => None,
        };

        let days_override = match cli.days {
            Some(days) if !(0..=MAX_EXTRA_DAYS).contains(&days) => {
                return Err(CliError::InvalidDays(days));
            }
            days => days,
        };

        Ok(Self {
            location_override,
            days_override,
            once: cli.once,
            settings_path: cli.settings.clone(),
        })
    }

    /// Applies the overrides to `settings` in memory
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(location) = &self.location_override {
            settings.locations = vec![location.clone()];
            settings.selected_location = 0;
        }
        if let Some(days) = self.days_override {
            settings.days_forecast = days;
        }
    }
}
