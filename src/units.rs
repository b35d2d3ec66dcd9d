//! Unit conversion and display formatting
//!
//! All raw readings arrive in fixed base units (°C, m/s, mbar, degrees).
//! The functions here convert them to the user's chosen units and render
//! display strings. They are pure and never touch the network or settings
//! storage.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while formatting a reading
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The reading was NaN or infinite
    #[error("Invalid value: {0}")]
    InvalidValue(f64),
}

/// Temperature display unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

/// Wind speed display unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSpeedUnit {
    #[default]
    KilometersPerHour,
    MilesPerHour,
    MetersPerSecond,
    Knots,
    Beaufort,
}

/// Pressure display unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureUnit {
    #[default]
    #[serde(rename = "mbar")]
    Millibar,
    #[serde(rename = "inhg")]
    InchesOfMercury,
    Bar,
    #[serde(rename = "pa")]
    Pascal,
    #[serde(rename = "kpa")]
    Kilopascal,
    #[serde(rename = "atm")]
    Atmosphere,
    #[serde(rename = "mmhg")]
    MillimetersOfMercury,
}

/// Clock format for displayed times
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockFormat {
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    AmPm,
    /// Follow the system; resolves to 24-hour
    #[default]
    System,
}

/// The user's unit choices, read synchronously by the display layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitPreferences {
    pub temperature: TemperatureUnit,
    pub wind_speed: WindSpeedUnit,
    pub pressure: PressureUnit,
    pub clock_format: ClockFormat,
    /// Drop the unit letter from degree labels ("21°" instead of "21°C")
    pub simplify_degrees: bool,
}

/// Upper bounds (m/s) of Beaufort forces 0 through 11; anything above is 12
const BEAUFORT_LIMITS: [f64; 12] = [
    0.5, 1.5, 3.3, 5.5, 7.9, 10.7, 13.8, 17.1, 20.7, 24.4, 28.4, 32.6,
];

/// 8-point compass labels, clockwise from north
const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn check(value: f64) -> Result<f64, UnitError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(UnitError::InvalidValue(value))
    }
}

/// Formats a temperature given in Celsius
pub fn format_temperature(celsius: f64, prefs: &UnitPreferences) -> Result<String, UnitError> {
    let celsius = check(celsius)?;

    let text = match prefs.temperature {
        TemperatureUnit::Celsius => {
            let suffix = if prefs.simplify_degrees { "" } else { "C" };
            format!("{:.0}\u{00B0}{}", celsius, suffix)
        }
        TemperatureUnit::Fahrenheit => {
            let suffix = if prefs.simplify_degrees { "" } else { "F" };
            format!("{:.0}\u{00B0}{}", celsius * 9.0 / 5.0 + 32.0, suffix)
        }
        TemperatureUnit::Kelvin => format!("{:.0} K", celsius + 273.15),
    };

    Ok(normalize_negative_zero(text))
}

/// Formats a wind speed given in m/s, optionally prefixed by a compass direction
pub fn format_wind(
    mps: f64,
    direction_degrees: Option<f64>,
    prefs: &UnitPreferences,
) -> Result<String, UnitError> {
    let mps = check(mps)?;

    let speed = match prefs.wind_speed {
        WindSpeedUnit::KilometersPerHour => format!("{:.0} km/h", mps * 3.6),
        WindSpeedUnit::MilesPerHour => format!("{:.0} mph", mps * 2.236_936),
        WindSpeedUnit::MetersPerSecond => format!("{:.1} m/s", mps),
        WindSpeedUnit::Knots => format!("{:.0} kn", mps * 1.943_844),
        WindSpeedUnit::Beaufort => format!("{} Bft", beaufort_number(mps)),
    };

    match direction_degrees {
        Some(degrees) => Ok(format!("{} {}", wind_direction(check(degrees)?), speed)),
        None => Ok(speed),
    }
}

/// Formats a surface pressure given in millibar
pub fn format_pressure(mbar: f64, prefs: &UnitPreferences) -> Result<String, UnitError> {
    let mbar = check(mbar)?;

    Ok(match prefs.pressure {
        PressureUnit::Millibar => format!("{:.0} mbar", mbar),
        PressureUnit::InchesOfMercury => format!("{:.2} inHg", mbar * 0.029_529_983),
        PressureUnit::Bar => format!("{:.3} bar", mbar / 1000.0),
        PressureUnit::Pascal => format!("{:.0} Pa", mbar * 100.0),
        PressureUnit::Kilopascal => format!("{:.1} kPa", mbar / 10.0),
        PressureUnit::Atmosphere => format!("{:.3} atm", mbar / 1013.25),
        PressureUnit::MillimetersOfMercury => format!("{:.0} mmHg", mbar * 0.750_061_68),
    })
}

/// Formats a relative humidity percentage
pub fn format_humidity(percent: f64) -> Result<String, UnitError> {
    Ok(format!("{:.0}%", check(percent)?))
}

/// Maps a bearing in degrees to an 8-point compass label
pub fn wind_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0) as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Converts a wind speed in m/s to its Beaufort force (0-12)
pub fn beaufort_number(mps: f64) -> u8 {
    BEAUFORT_LIMITS
        .iter()
        .position(|limit| mps < *limit)
        .unwrap_or(BEAUFORT_LIMITS.len()) as u8
}

/// Formats the clock time of an instant in its own offset
pub fn format_time<Tz: TimeZone>(instant: &DateTime<Tz>, clock_format: ClockFormat) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match clock_format {
        ClockFormat::AmPm => instant.format("%-I:%M %p").to_string(),
        ClockFormat::TwentyFourHour | ClockFormat::System => {
            instant.format("%H:%M").to_string()
        }
    }
}

/// `format!` renders -0.4 rounded as "-0"
fn normalize_negative_zero(text: String) -> String {
    match text.strip_prefix("-0") {
        Some(rest) if !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
            format!("0{}", rest)
        }
        _ => text,
    }
}
