//! Core weather data models
//!
//! This module contains the immutable value types produced by one fetch cycle:
//! the point-in-time [`WeatherSnapshot`], the hourly [`ForecastEntry`], and the
//! day-major [`ForecastGrid`] that the current snapshot owns.

pub mod weather;

pub use weather::{WeatherClient, WeatherError};

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::{self, UnitError, UnitPreferences};

/// Maximum number of hour slots in one forecast day
pub const HOURS_PER_DAY: usize = 24;

/// Length of one forecast slot in milliseconds
pub const SLOT_MILLIS: i64 = 3_600_000;

/// Errors raised when constructing snapshot or grid values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// No condition text was supplied
    #[error("Weather condition text is missing")]
    MissingCondition,

    /// A forecast day holds more hour slots than a day has
    #[error("Forecast day {day} has {count} entries, at most 24 allowed")]
    TooManyHours { day: usize, count: usize },

    /// Hour slots within a day are not strictly increasing
    #[error("Forecast day {day} is not in time order")]
    UnorderedHours { day: usize },
}

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are inside their valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Instantaneous readings in base units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Feels-like temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: f64,
    /// Surface pressure in millibar
    pub pressure: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360)
    pub wind_direction: f64,
    /// Gust speed in m/s, when reported
    pub gusts: Option<f64>,
}

/// Precipitation detail for one forecast hour
///
/// Each field is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Precipitation {
    /// Probability in percent
    pub probability: Option<f64>,
    /// Total precipitation in mm
    pub total: Option<f64>,
    /// Rain in mm
    pub rain: Option<f64>,
    /// Showers in mm
    pub showers: Option<f64>,
    /// Snowfall in mm
    pub snowfall: Option<f64>,
}

/// Sunrise and sunset of the first forecast day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

/// One fully formed weather observation for a single point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    readings: Readings,
    icon: String,
    condition: String,
    sun: SunTimes,
    forecast: Option<ForecastGrid>,
    precipitation: Precipitation,
}

impl WeatherSnapshot {
    /// Creates a snapshot
    ///
    /// # Returns
    /// * `Err(SnapshotError::MissingCondition)` if `condition` is `None`
    ///
    /// A grid without any entries is stored as absent.
    pub fn new(
        readings: Readings,
        icon: impl Into<String>,
        condition: Option<String>,
        sun: SunTimes,
        forecast: Option<ForecastGrid>,
        precipitation: Precipitation,
    ) -> Result<Self, SnapshotError> {
        let condition = condition.ok_or(SnapshotError::MissingCondition)?;

        Ok(Self {
            readings,
            icon: icon.into(),
            condition,
            sun,
            forecast: forecast.filter(|grid| !grid.is_empty()),
            precipitation,
        })
    }

    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    pub fn icon_name(&self) -> &str {
        &self.icon
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn sunrise(&self) -> DateTime<FixedOffset> {
        self.sun.sunrise
    }

    pub fn sunset(&self) -> DateTime<FixedOffset> {
        self.sun.sunset
    }

    /// Offset of the location this snapshot was fetched for
    pub fn utc_offset(&self) -> FixedOffset {
        *self.sun.sunrise.offset()
    }

    pub fn precipitation(&self) -> &Precipitation {
        &self.precipitation
    }

    pub fn forecast(&self) -> Option<&ForecastGrid> {
        self.forecast.as_ref()
    }

    pub fn has_forecast(&self) -> bool {
        self.forecast.is_some()
    }

    pub fn gusts_available(&self) -> bool {
        self.readings.gusts.is_some()
    }

    pub fn display_temperature(&self, prefs: &UnitPreferences) -> Result<String, UnitError> {
        units::format_temperature(self.readings.temperature, prefs)
    }

    pub fn display_feels_like(&self, prefs: &UnitPreferences) -> Result<String, UnitError> {
        units::format_temperature(self.readings.feels_like, prefs)
    }

    pub fn display_humidity(&self) -> Result<String, UnitError> {
        units::format_humidity(self.readings.humidity)
    }

    pub fn display_pressure(&self, prefs: &UnitPreferences) -> Result<String, UnitError> {
        units::format_pressure(self.readings.pressure, prefs)
    }

    /// Wind speed composed with its compass direction
    pub fn display_wind(&self, prefs: &UnitPreferences) -> Result<String, UnitError> {
        units::format_wind(
            self.readings.wind_speed,
            Some(self.readings.wind_direction),
            prefs,
        )
    }

    /// Gust speed, or `None` when gusts were not reported
    pub fn display_gusts(&self, prefs: &UnitPreferences) -> Option<Result<String, UnitError>> {
        self.readings
            .gusts
            .map(|gusts| units::format_wind(gusts, None, prefs))
    }

    pub fn display_sunrise(&self, prefs: &UnitPreferences) -> String {
        units::format_time(&self.sun.sunrise, prefs.clock_format)
    }

    pub fn display_sunset(&self, prefs: &UnitPreferences) -> String {
        units::format_time(&self.sun.sunset, prefs.clock_format)
    }
}

/// One hour slot of the forecast grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    weather: WeatherSnapshot,
}

impl ForecastEntry {
    /// Creates an entry covering exactly one hour from `start`
    pub fn new(start: DateTime<FixedOffset>, weather: WeatherSnapshot) -> Self {
        Self {
            start,
            end: start + Duration::milliseconds(SLOT_MILLIS),
            weather,
        }
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / SLOT_MILLIS as f64
    }

    pub fn display_time(&self, prefs: &UnitPreferences) -> String {
        units::format_time(&self.start, prefs.clock_format)
    }

    pub fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }
}

/// Day-major, hour-minor forecast grid built once per fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastGrid {
    days: Vec<Vec<ForecastEntry>>,
}

impl ForecastGrid {
    /// Creates a grid, validating the per-day size and ordering
    pub fn new(days: Vec<Vec<ForecastEntry>>) -> Result<Self, SnapshotError> {
        for (day, entries) in days.iter().enumerate() {
            if entries.len() > HOURS_PER_DAY {
                return Err(SnapshotError::TooManyHours {
                    day,
                    count: entries.len(),
                });
            }

            if entries.windows(2).any(|pair| pair[0].start >= pair[1].start) {
                return Err(SnapshotError::UnorderedHours { day });
            }
        }

        Ok(Self { days })
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Number of entries in `day`, zero for days past the end
    pub fn hour_count(&self, day: usize) -> usize {
        self.days.get(day).map_or(0, Vec::len)
    }

    pub fn entry(&self, day: usize, hour: usize) -> Option<&ForecastEntry> {
        self.days.get(day)?.get(hour)
    }

    pub fn day(&self, day: usize) -> Option<&[ForecastEntry]> {
        self.days.get(day).map(Vec::as_slice)
    }

    pub fn days(&self) -> impl Iterator<Item = &[ForecastEntry]> {
        self.days.iter().map(Vec::as_slice)
    }

    /// All entries in day-major, hour-minor order
    pub fn entries(&self) -> impl Iterator<Item = &ForecastEntry> {
        self.days.iter().flatten()
    }

    /// Whether the grid holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Builders shared by unit tests across the crate

    use super::*;
    use chrono::{NaiveDate, TimeZone};

    pub fn offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        offset()
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 7, day)
                    .unwrap()
                    .and_hms_opt(hour, minute, 0)
                    .unwrap(),
            )
            .unwrap()
    }

    pub fn readings(temperature: f64) -> Readings {
        Readings {
            temperature,
            feels_like: temperature + 1.0,
            humidity: 65.0,
            pressure: 1013.0,
            wind_speed: 5.0,
            wind_direction: 270.0,
            gusts: Some(9.0),
        }
    }

    pub fn sun() -> SunTimes {
        SunTimes {
            sunrise: at(15, 5, 30),
            sunset: at(15, 21, 15),
        }
    }

    pub fn hour_snapshot(temperature: f64, precipitation: Precipitation) -> WeatherSnapshot {
        WeatherSnapshot::new(
            readings(temperature),
            "weather-clear-symbolic",
            Some("Clear sky".to_string()),
            sun(),
            None,
            precipitation,
        )
        .unwrap()
    }

    /// A grid of `days` days starting 2024-07-15 00:00 with `hours[i]` entries per day
    pub fn grid(hours: &[usize]) -> ForecastGrid {
        let days = hours
            .iter()
            .enumerate()
            .map(|(day, count)| {
                (0..*count)
                    .map(|hour| {
                        ForecastEntry::new(
                            at(15 + day as u32, hour as u32, 0),
                            hour_snapshot(hour as f64, Precipitation::default()),
                        )
                    })
                    .collect()
            })
            .collect();
        ForecastGrid::new(days).unwrap()
    }

    pub fn current_snapshot(forecast: Option<ForecastGrid>) -> WeatherSnapshot {
        WeatherSnapshot::new(
            readings(22.4),
            "weather-few-clouds-symbolic",
            Some("Partly cloudy".to_string()),
            sun(),
            forecast,
            Precipitation::default(),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_snapshot_requires_condition() {
        let result = WeatherSnapshot::new(
            readings(20.0),
            "weather-clear-symbolic",
            None,
            sun(),
            None,
            Precipitation::default(),
        );
        assert_eq!(result, Err(SnapshotError::MissingCondition));
    }

    #[test]
    fn test_snapshot_allows_untranslated_empty_condition() {
        let snapshot = WeatherSnapshot::new(
            readings(20.0),
            "weather-clear-symbolic",
            Some(String::new()),
            sun(),
            None,
            Precipitation::default(),
        )
        .expect("Empty condition text should be accepted");
        assert_eq!(snapshot.condition(), "");
    }

    #[test]
    fn test_empty_grid_is_normalized_to_absent() {
        let snapshot = current_snapshot(Some(ForecastGrid::new(vec![]).unwrap()));
        assert!(!snapshot.has_forecast());

        let snapshot = current_snapshot(Some(grid(&[0, 0])));
        assert!(snapshot.forecast().is_none());

        let snapshot = current_snapshot(Some(grid(&[2])));
        assert!(snapshot.has_forecast());
    }

    #[test]
    fn test_entry_spans_exactly_one_hour() {
        let entry = ForecastEntry::new(at(15, 3, 0), hour_snapshot(10.0, Precipitation::default()));
        assert_eq!((entry.end() - entry.start()).num_milliseconds(), SLOT_MILLIS);
        assert!((entry.duration_hours() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_grid_rejects_more_than_24_hours() {
        let day: Vec<ForecastEntry> = (0..25)
            .map(|i| {
                ForecastEntry::new(
                    at(15, 0, 0) + Duration::hours(i),
                    hour_snapshot(0.0, Precipitation::default()),
                )
            })
            .collect();

        assert_eq!(
            ForecastGrid::new(vec![day]),
            Err(SnapshotError::TooManyHours { day: 0, count: 25 })
        );
    }

    #[test]
    fn test_grid_rejects_unordered_day() {
        let day = vec![
            ForecastEntry::new(at(15, 5, 0), hour_snapshot(0.0, Precipitation::default())),
            ForecastEntry::new(at(15, 4, 0), hour_snapshot(0.0, Precipitation::default())),
        ];
        assert_eq!(
            ForecastGrid::new(vec![day]),
            Err(SnapshotError::UnorderedHours { day: 0 })
        );
    }

    #[test]
    fn test_grid_accessors() {
        let grid = grid(&[24, 6]);
        assert_eq!(grid.day_count(), 2);
        assert_eq!(grid.hour_count(0), 24);
        assert_eq!(grid.hour_count(1), 6);
        assert_eq!(grid.hour_count(5), 0);
        assert_eq!(grid.entries().count(), 30);
        assert_eq!(grid.entry(1, 0).unwrap().start(), at(16, 0, 0));
        assert!(grid.entry(1, 6).is_none());
    }

    #[test]
    fn test_snapshot_display_methods() {
        let prefs = UnitPreferences::default();
        let snapshot = current_snapshot(None);

        assert_eq!(snapshot.display_temperature(&prefs).unwrap(), "22\u{00B0}C");
        assert_eq!(snapshot.display_feels_like(&prefs).unwrap(), "23\u{00B0}C");
        assert_eq!(snapshot.display_humidity().unwrap(), "65%");
        assert_eq!(snapshot.display_pressure(&prefs).unwrap(), "1013 mbar");
        assert_eq!(snapshot.display_wind(&prefs).unwrap(), "W 18 km/h");
        assert!(snapshot.gusts_available());
        assert_eq!(snapshot.display_gusts(&prefs).unwrap().unwrap(), "32 km/h");
        assert_eq!(snapshot.display_sunrise(&prefs), "05:30");
        assert_eq!(snapshot.display_sunset(&prefs), "21:15");
    }

    #[test]
    fn test_precipitation_fields_are_independent() {
        let snapshot = hour_snapshot(
            5.0,
            Precipitation {
                snowfall: Some(1.2),
                ..Default::default()
            },
        );
        let precipitation = snapshot.precipitation();
        assert_eq!(precipitation.snowfall, Some(1.2));
        assert!(precipitation.rain.is_none());
        assert!(precipitation.probability.is_none());
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(49.28, -123.12).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
    }
}
