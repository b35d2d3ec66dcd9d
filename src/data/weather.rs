//! Open-Meteo weather API client
//!
//! This module fetches current conditions and the hourly series from the
//! Open-Meteo API and builds them into a [`WeatherSnapshot`] that owns its
//! [`ForecastGrid`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{
    Coordinates, ForecastEntry, ForecastGrid, Precipitation, Readings, SnapshotError, SunTimes,
    WeatherSnapshot, HOURS_PER_DAY,
};
use crate::conditions::{self, Translate, UNKNOWN_CODE};
use crate::selection::forecast_day_count;

/// Base URL for the Open-Meteo API
const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Fields requested for the current block
const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
surface_pressure,wind_speed_10m,wind_direction_10m,wind_gusts_10m,weathercode";

/// Fields requested for the hourly series
const HOURLY_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
surface_pressure,wind_speed_10m,wind_direction_10m,wind_gusts_10m,weathercode,\
precipitation_probability,precipitation,rain,showers,snowfall";

/// Fields requested for the daily series
const DAILY_FIELDS: &str = "sunrise,sunset";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Invalid time format in response
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// Coordinates outside the valid latitude/longitude ranges
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// The response could not be assembled into a snapshot
    #[error("Invalid weather data: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Client for fetching weather data from Open-Meteo API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    timezone: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    /// Create a new WeatherClient with default settings
    ///
    /// The timezone defaults to `auto`, which makes Open-Meteo report times
    /// in the location's own offset.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: OPEN_METEO_BASE_URL.to_string(),
            timezone: "auto".to_string(),
        }
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            ..Self::new()
        }
    }

    /// Point the client at a different forecast endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a new WeatherClient with a custom timezone
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Fetch current weather and the forecast grid for the given coordinates
    ///
    /// # Arguments
    /// * `coordinates` - Location to fetch
    /// * `forecast_days` - Extra days after today, clamped to 0-7
    /// * `translate` - Translator for condition text; `None` leaves it empty
    ///
    /// # Returns
    /// * `Ok(Some(WeatherSnapshot))` - Fully built snapshot with its grid
    /// * `Ok(None)` - The server answered with a non-2xx status
    /// * `Err(WeatherError)` - Network, decoding, or construction failure
    #[instrument(
        skip(self, translate),
        fields(lat = coordinates.latitude, lon = coordinates.longitude)
    )]
    pub async fn fetch_weather(
        &self,
        coordinates: Coordinates,
        forecast_days: i32,
        translate: Option<Translate<'_>>,
    ) -> Result<Option<WeatherSnapshot>, WeatherError> {
        if !coordinates.is_valid() {
            return Err(WeatherError::InvalidCoordinates);
        }

        let query = self.query(coordinates, forecast_day_count(forecast_days));
        let response = self.client.get(&self.base_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Open-Meteo answered without data");
            return Ok(None);
        }

        let text = response.text().await?;
        let api_response: OpenMeteoResponse = serde_json::from_str(&text)?;

        self.parse_response(api_response, forecast_days, translate, Utc::now())
            .map(Some)
    }

    /// Query parameters for one forecast request
    fn query(&self, coordinates: Coordinates, day_count: usize) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("timezone", self.timezone.clone()),
            ("temperature_unit", "celsius".to_string()),
            ("wind_speed_unit", "ms".to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("forecast_days", day_count.to_string()),
        ]
    }

    /// Build the current snapshot and its forecast grid from a decoded response
    fn parse_response(
        &self,
        response: OpenMeteoResponse,
        forecast_days: i32,
        translate: Option<Translate<'_>>,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let offset = FixedOffset::east_opt(response.utc_offset_seconds).ok_or_else(|| {
            WeatherError::InvalidTimeFormat(format!(
                "utc_offset_seconds {}",
                response.utc_offset_seconds
            ))
        })?;

        // Day 0's sunrise and sunset classify night for every forecast day
        let sunrise_str = response
            .daily
            .sunrise
            .first()
            .ok_or_else(|| WeatherError::MissingField("sunrise".to_string()))?;
        let sunset_str = response
            .daily
            .sunset
            .first()
            .ok_or_else(|| WeatherError::MissingField("sunset".to_string()))?;
        let sun = SunTimes {
            sunrise: parse_instant(sunrise_str, offset)?,
            sunset: parse_instant(sunset_str, offset)?,
        };

        let grid = build_grid(&response.hourly, forecast_days, sun, offset, translate)?;

        let current = &response.current;
        let now = now.with_timezone(&offset);
        let night = conditions::is_night(&now, &sun.sunrise, &sun.sunset);
        let mapped = conditions::map_condition_code(
            current.weathercode.unwrap_or(UNKNOWN_CODE),
            night,
            translate,
        );

        let snapshot = WeatherSnapshot::new(
            Readings {
                temperature: current.temperature_2m,
                feels_like: current.apparent_temperature,
                humidity: current.relative_humidity_2m,
                pressure: current.surface_pressure,
                wind_speed: current.wind_speed_10m,
                wind_direction: current.wind_direction_10m,
                gusts: current.wind_gusts_10m,
            },
            mapped.icon,
            Some(mapped.condition),
            sun,
            Some(grid),
            Precipitation::default(),
        )?;

        Ok(snapshot)
    }
}

/// Build the day-major grid, ending a day early when the series runs out or
/// stops moving forward in time
fn build_grid(
    hourly: &HourlyWeather,
    forecast_days: i32,
    sun: SunTimes,
    offset: FixedOffset,
    translate: Option<Translate<'_>>,
) -> Result<ForecastGrid, WeatherError> {
    let day_count = forecast_day_count(forecast_days);
    let mut days = Vec::with_capacity(day_count);

    for day in 0..day_count {
        let mut entries: Vec<ForecastEntry> = Vec::with_capacity(HOURS_PER_DAY);
        for hour in 0..HOURS_PER_DAY {
            let index = day * HOURS_PER_DAY + hour;
            let Some(entry) = build_entry(hourly, index, sun, offset, translate)? else {
                break;
            };
            if entries.last().is_some_and(|last| entry.start() <= last.start()) {
                debug!(index, "Ending forecast day at out-of-order hour");
                break;
            }
            entries.push(entry);
        }
        days.push(entries);
    }

    Ok(ForecastGrid::new(days)?)
}

/// Build the entry at `index` of the hourly series
///
/// Returns `Ok(None)` when the series has no usable slot at `index`.
fn build_entry(
    hourly: &HourlyWeather,
    index: usize,
    sun: SunTimes,
    offset: FixedOffset,
    translate: Option<Translate<'_>>,
) -> Result<Option<ForecastEntry>, WeatherError> {
    let Some(time_str) = value_at(&hourly.time, index) else {
        return Ok(None);
    };
    let start = match parse_instant(&time_str, offset) {
        Ok(start) => start,
        Err(e) => {
            debug!(index, error = %e, "Ending forecast day at malformed hour");
            return Ok(None);
        }
    };

    let readings = (|| {
        Some(Readings {
            temperature: value_at(&hourly.temperature_2m, index)?,
            feels_like: value_at(&hourly.apparent_temperature, index)?,
            humidity: value_at(&hourly.relative_humidity_2m, index)?,
            pressure: value_at(&hourly.surface_pressure, index)?,
            wind_speed: value_at(&hourly.wind_speed_10m, index)?,
            wind_direction: value_at(&hourly.wind_direction_10m, index)?,
            gusts: value_at(&hourly.wind_gusts_10m, index),
        })
    })();
    let Some(readings) = readings else {
        debug!(index, "Ending forecast day at incomplete hour");
        return Ok(None);
    };

    let night = conditions::is_night(&start, &sun.sunrise, &sun.sunset);
    let code = value_at(&hourly.weathercode, index).unwrap_or(UNKNOWN_CODE);
    let mapped = conditions::map_condition_code(code, night, translate);

    let precipitation = Precipitation {
        probability: value_at(&hourly.precipitation_probability, index),
        total: value_at(&hourly.precipitation, index),
        rain: value_at(&hourly.rain, index),
        showers: value_at(&hourly.showers, index),
        snowfall: value_at(&hourly.snowfall, index),
    };

    let weather = WeatherSnapshot::new(
        readings,
        mapped.icon,
        Some(mapped.condition),
        sun,
        None,
        precipitation,
    )?;

    Ok(Some(ForecastEntry::new(start, weather)))
}

/// Value at `index` of a parallel hourly array, treating nulls and short arrays alike
fn value_at<T: Clone>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).cloned().flatten()
}

/// Parse a datetime string in ISO 8601 format (e.g., "2024-07-15T05:30") to NaiveDateTime
fn parse_datetime(datetime_str: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%dT%H:%M")
        .map_err(|_| WeatherError::InvalidTimeFormat(datetime_str.to_string()))
}

/// Parse a location-local time string into an instant at `offset`
fn parse_instant(
    datetime_str: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, WeatherError> {
    parse_datetime(datetime_str)?
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| WeatherError::InvalidTimeFormat(datetime_str.to_string()))
}

/// Open-Meteo API response structure
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    current: CurrentWeather,
    #[serde(default)]
    hourly: HourlyWeather,
    daily: DailyWeather,
}

/// Current weather data from Open-Meteo
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    surface_pressure: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    #[serde(default)]
    wind_gusts_10m: Option<f64>,
    #[serde(default, alias = "weather_code")]
    weathercode: Option<i32>,
}

/// Daily weather data from Open-Meteo
#[derive(Debug, Deserialize)]
struct DailyWeather {
    #[serde(default)]
    sunrise: Vec<String>,
    #[serde(default)]
    sunset: Vec<String>,
}

/// Hourly weather data from Open-Meteo, as parallel arrays indexed by hour offset
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HourlyWeather {
    time: Vec<Option<String>>,
    temperature_2m: Vec<Option<f64>>,
    apparent_temperature: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    surface_pressure: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    wind_direction_10m: Vec<Option<f64>>,
    wind_gusts_10m: Vec<Option<f64>>,
    #[serde(alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
    precipitation_probability: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    rain: Vec<Option<f64>>,
    showers: Vec<Option<f64>>,
    snowfall: Vec<Option<f64>>,
}
