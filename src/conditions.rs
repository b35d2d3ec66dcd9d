//! Weather code to icon and condition text mapping
//!
//! Open-Meteo reports conditions as WMO weather codes. Each code maps to a
//! symbolic icon category and, separately, to a human-readable condition
//! string that may be passed through a translator.

use chrono::{DateTime, TimeZone};

/// Translation hook applied to condition text and panel labels
pub type Translate<'a> = &'a (dyn Fn(&str) -> String + Send + Sync);

/// Condition text used for codes missing from the table
pub const UNAVAILABLE_CONDITION: &str = "Not available";

/// Code used when the upstream series has no weather code for an hour
pub const UNKNOWN_CODE: i32 = -1;

/// Icon categories available in the symbolic icon set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Clear,
    FewClouds,
    Overcast,
    Fog,
    ShowersScattered,
    Showers,
    FreezingRain,
    Snow,
    Storm,
}

impl WeatherIcon {
    /// Base icon name without prefix or suffix
    pub fn name(self) -> &'static str {
        match self {
            WeatherIcon::Clear => "clear",
            WeatherIcon::FewClouds => "few-clouds",
            WeatherIcon::Overcast => "overcast",
            WeatherIcon::Fog => "fog",
            WeatherIcon::ShowersScattered => "showers-scattered",
            WeatherIcon::Showers => "showers",
            WeatherIcon::FreezingRain => "freezing-rain",
            WeatherIcon::Snow => "snow",
            WeatherIcon::Storm => "storm",
        }
    }

    /// Whether the icon set ships a distinct night image for this category
    pub fn has_night_variant(self) -> bool {
        matches!(self, WeatherIcon::Clear | WeatherIcon::FewClouds)
    }

    /// Full symbolic icon identifier, e.g. `weather-clear-night-symbolic`
    pub fn identifier(self, is_night: bool) -> String {
        let night = if is_night && self.has_night_variant() {
            "-night"
        } else {
            ""
        };
        format!("weather-{}{}-symbolic", self.name(), night)
    }
}

/// Icon identifier and display text for one weather code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCondition {
    pub icon: String,
    pub condition: String,
}

/// Map WMO weather code to its icon category
///
/// Unknown codes fall back to `FewClouds`.
pub fn weather_code_to_icon(code: i32) -> WeatherIcon {
    match code {
        0 => WeatherIcon::Clear,
        1 | 2 => WeatherIcon::FewClouds,
        3 => WeatherIcon::Overcast,
        45 | 48 => WeatherIcon::Fog,
        51 | 53 | 61 | 80 => WeatherIcon::ShowersScattered,
        55 | 63 | 65 | 81 | 82 => WeatherIcon::Showers,
        56 | 57 | 66 | 67 => WeatherIcon::FreezingRain,
        71 | 73 | 75 | 77 | 85 | 86 => WeatherIcon::Snow,
        95 | 96 | 99 => WeatherIcon::Storm,
        _ => WeatherIcon::FewClouds,
    }
}

/// Untranslated condition text for a WMO weather code
pub fn weather_code_to_text(code: i32) -> Option<&'static str> {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => return None,
    };
    Some(text)
}

/// Maps a weather code and day/night flag to an icon identifier and condition text
///
/// Without a translator the condition text is empty, so callers that only
/// need icons do not have to supply one.
pub fn map_condition_code(
    code: i32,
    is_night: bool,
    translate: Option<Translate<'_>>,
) -> MappedCondition {
    let icon = weather_code_to_icon(code).identifier(is_night);
    let condition = match translate {
        Some(translate) => translate(weather_code_to_text(code).unwrap_or(UNAVAILABLE_CONDITION)),
        None => String::new(),
    };

    MappedCondition { icon, condition }
}

/// Whether `time` falls outside the daylight window `[sunrise, sunset)`
pub fn is_night<Tz: TimeZone>(
    time: &DateTime<Tz>,
    sunrise: &DateTime<Tz>,
    sunset: &DateTime<Tz>,
) -> bool {
    time < sunrise || time >= sunset
}

/// Translator that returns the text unchanged
pub fn untranslated(text: &str) -> String {
    text.to_string()
}
