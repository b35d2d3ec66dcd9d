//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

/// Path the mock server answers on
pub const FORECAST_PATH: &str = "/v1/forecast";

/// Hourly times starting 2024-07-15T00:00
pub fn hourly_times(hours: usize) -> Vec<String> {
    let start = NaiveDate::from_ymd_opt(2024, 7, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..hours)
        .map(|i| {
            (start + Duration::hours(i as i64))
                .format("%Y-%m-%dT%H:%M")
                .to_string()
        })
        .collect()
}

/// Open-Meteo style response with `hours` entries in the hourly series
pub fn forecast_body(hours: usize) -> Value {
    let series = |value: f64| vec![value; hours];
    json!({
        "latitude": 49.28,
        "longitude": -123.12,
        "utc_offset_seconds": -25200,
        "timezone": "America/Vancouver",
        "current": {
            "time": "2024-07-15T14:00",
            "temperature_2m": 22.4,
            "apparent_temperature": 23.6,
            "relative_humidity_2m": 65,
            "surface_pressure": 1012.4,
            "wind_speed_10m": 3.5,
            "wind_direction_10m": 225,
            "wind_gusts_10m": 7.1,
            "weathercode": 61
        },
        "hourly": {
            "time": hourly_times(hours),
            "temperature_2m": series(15.2),
            "apparent_temperature": series(14.0),
            "relative_humidity_2m": series(80.0),
            "surface_pressure": series(1010.0),
            "wind_speed_10m": series(2.0),
            "wind_direction_10m": series(180.0),
            "wind_gusts_10m": series(4.0),
            "weathercode": vec![61; hours],
            "precipitation_probability": series(70.0),
            "precipitation": series(1.4),
            "rain": series(1.4),
            "showers": series(0.0),
            "snowfall": series(0.0)
        },
        "daily": {
            "time": ["2024-07-15"],
            "sunrise": ["2024-07-15T05:30"],
            "sunset": ["2024-07-15T21:15"]
        }
    })
}
