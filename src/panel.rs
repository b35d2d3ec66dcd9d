//! Display-ready view models
//!
//! Pure builders that turn a [`WeatherSnapshot`] and the user's settings into
//! the strings the interface shows. Nothing here performs I/O, so the
//! terminal UI and the `--once` report render the same text.

use chrono::{DateTime, Utc};

use crate::data::{ForecastEntry, ForecastGrid, Precipitation, WeatherSnapshot};
use crate::selection::{select_window, WINDOW_SIZE};
use crate::settings::Settings;
use crate::units::{self, UnitError, UnitPreferences};

/// Icon shown in hour cells that have no forecast entry
pub const PLACEHOLDER_ICON: &str = "view-refresh-symbolic";

/// Marker appended to truncated location names
const ELLIPSIS: &str = "...";

/// Which kind of precipitation an hour expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationSymbol {
    Rain,
    Snow,
    Mixed,
}

impl PrecipitationSymbol {
    /// Picks the symbol from the rain, showers, and snowfall amounts
    ///
    /// Missing amounts count as zero. Anything that is not snow is shown as rain.
    pub fn for_amounts(precipitation: &Precipitation) -> Self {
        let rain = precipitation.rain.unwrap_or(0.0) + precipitation.showers.unwrap_or(0.0);
        let snow = precipitation.snowfall.unwrap_or(0.0);

        if rain > 0.0 && snow > 0.0 {
            Self::Mixed
        } else if snow > 0.0 {
            Self::Snow
        } else {
            Self::Rain
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Rain => "\u{2614}\u{FE0E}",
            Self::Snow => "\u{2744}",
            Self::Mixed => "\u{2614}\u{FE0E}\u{2744}",
        }
    }
}

/// Precipitation line for one hour, e.g. `"☔︎ 40% 1.2 mm"`
///
/// Returns `None` unless the probability or the amount is above zero.
pub fn precipitation_text(precipitation: &Precipitation) -> Option<String> {
    let probability = precipitation.probability;
    let total = precipitation.total;

    let expected =
        probability.is_some_and(|p| p > 0.0) || total.is_some_and(|amount| amount > 0.0);
    if !expected {
        return None;
    }

    let mut parts = Vec::with_capacity(2);
    if let Some(p) = probability {
        parts.push(format!("{:.0}%", p.round()));
    }
    if let Some(amount) = total {
        parts.push(format!("{:.1} mm", amount));
    }

    Some(format!(
        "{} {}",
        PrecipitationSymbol::for_amounts(precipitation).glyph(),
        parts.join(" ")
    ))
}

/// Truncates `name` to `max_chars` characters, ending in `...`
///
/// A limit of zero means no limit.
pub fn truncate_location(name: &str, max_chars: usize) -> String {
    if max_chars == 0 || name.chars().count() <= max_chars {
        return name.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = name.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// The panel line: condition and/or temperature joined with `", "`
pub fn panel_text(settings: &Settings, condition: &str, temperature: &str) -> String {
    let condition = if settings.comment_in_panel { condition } else { "" };
    let temperature = if settings.text_in_panel { temperature } else { "" };

    match (condition.is_empty(), temperature.is_empty()) {
        (false, false) => format!("{}, {}", condition, temperature),
        (false, true) => condition.to_string(),
        (true, _) => temperature.to_string(),
    }
}

/// The sun event shown next to the panel header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SunEvent {
    Sunrise(String),
    Sunset(String),
}

impl SunEvent {
    /// Sunset while the sun is up, sunrise otherwise
    pub fn next(snapshot: &WeatherSnapshot, prefs: &UnitPreferences, now: DateTime<Utc>) -> Self {
        let now = now.with_timezone(&snapshot.utc_offset());
        let sun_up = now >= snapshot.sunrise() && now < snapshot.sunset();
        if sun_up {
            Self::Sunset(snapshot.display_sunset(prefs))
        } else {
            Self::Sunrise(snapshot.display_sunrise(prefs))
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Sunrise(_) => "daytime-sunrise-symbolic",
            Self::Sunset(_) => "daytime-sunset-symbolic",
        }
    }

    pub fn time(&self) -> &str {
        match self {
            Self::Sunrise(time) | Self::Sunset(time) => time,
        }
    }
}

/// Current conditions block
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPanel {
    pub location: String,
    pub icon: String,
    /// Text next to the panel icon
    pub panel_text: String,
    /// `"<condition>, <temperature>"`
    pub summary: String,
    pub sun_event: SunEvent,
    pub sunrise: String,
    pub sunset: String,
    pub feels_like: String,
    pub humidity: String,
    pub pressure: String,
    pub wind: String,
    /// Gust speed, `None` when gusts were not reported
    pub gusts: Option<String>,
    pub last_updated: String,
}

impl CurrentPanel {
    /// Builds the current conditions block
    ///
    /// # Arguments
    /// * `snapshot` - Current snapshot
    /// * `settings` - Display settings and units
    /// * `location` - Untruncated location name
    /// * `now` - Time used to pick the next sun event
    /// * `last_updated` - When the snapshot was fetched, shown in the location's time
    pub fn build(
        snapshot: &WeatherSnapshot,
        settings: &Settings,
        location: &str,
        now: DateTime<Utc>,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, UnitError> {
        let prefs = &settings.units;
        let temperature = snapshot.display_temperature(prefs)?;
        let condition = snapshot.condition();

        Ok(Self {
            location: truncate_location(location, settings.location_name_length),
            icon: snapshot.icon_name().to_string(),
            panel_text: panel_text(settings, condition, &temperature),
            summary: format!("{}, {}", condition, temperature),
            sun_event: SunEvent::next(snapshot, prefs, now),
            sunrise: snapshot.display_sunrise(prefs),
            sunset: snapshot.display_sunset(prefs),
            feels_like: snapshot.display_feels_like(prefs)?,
            humidity: snapshot.display_humidity()?,
            pressure: snapshot.display_pressure(prefs)?,
            wind: snapshot.display_wind(prefs)?,
            gusts: snapshot.display_gusts(prefs).transpose()?,
            last_updated: units::format_time(
                &last_updated.with_timezone(&snapshot.utc_offset()),
                prefs.clock_format,
            ),
        })
    }
}

/// One hour of the hourly strip or a forecast day
#[derive(Debug, Clone, PartialEq)]
pub struct HourCell {
    pub time: String,
    pub icon: String,
    pub temperature: String,
    pub condition: String,
    /// Precipitation line, hidden when `None`
    pub precipitation: Option<String>,
}

impl HourCell {
    pub fn from_entry(entry: &ForecastEntry, prefs: &UnitPreferences) -> Result<Self, UnitError> {
        let weather = entry.weather();
        Ok(Self {
            time: entry.display_time(prefs),
            icon: weather.icon_name().to_string(),
            temperature: weather.display_temperature(prefs)?,
            condition: weather.condition().to_string(),
            precipitation: precipitation_text(weather.precipitation()),
        })
    }

    /// Empty cell shown when fewer entries than slots are available
    pub fn placeholder() -> Self {
        Self {
            time: String::new(),
            icon: PLACEHOLDER_ICON.to_string(),
            temperature: String::new(),
            condition: String::new(),
            precipitation: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.time.is_empty() && self.icon == PLACEHOLDER_ICON
    }
}

/// The compact strip of upcoming hours
#[derive(Debug, Clone, PartialEq)]
pub struct TodayStrip {
    /// Always [`WINDOW_SIZE`] cells; missing hours are placeholders
    pub cells: Vec<HourCell>,
}

impl TodayStrip {
    /// Builds the strip for `now`, aligned to the location's hours
    pub fn build(
        grid: &ForecastGrid,
        offset: chrono::FixedOffset,
        prefs: &UnitPreferences,
        now: DateTime<Utc>,
    ) -> Result<Self, UnitError> {
        let window = select_window(grid, now.with_timezone(&offset));

        let mut cells = window
            .into_iter()
            .map(|entry| HourCell::from_entry(entry, prefs))
            .collect::<Result<Vec<_>, _>>()?;
        cells.resize_with(WINDOW_SIZE, HourCell::placeholder);

        Ok(Self { cells })
    }
}

/// All hours of one forecast day
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// `Today`, `Tomorrow`, or the weekday name
    pub label: String,
    pub cells: Vec<HourCell>,
    /// Raw temperatures in Celsius, one per cell, for charts
    pub temperatures: Vec<f64>,
}

impl ForecastDay {
    /// Builds one entry per grid day that has data
    pub fn build_all(grid: &ForecastGrid, prefs: &UnitPreferences) -> Result<Vec<Self>, UnitError> {
        grid.days()
            .enumerate()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(index, entries)| Self::build(index, entries, prefs))
            .collect()
    }

    fn build(
        index: usize,
        entries: &[ForecastEntry],
        prefs: &UnitPreferences,
    ) -> Result<Self, UnitError> {
        let label = match index {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            _ => entries
                .first()
                .map(|entry| entry.start().format("%A").to_string())
                .unwrap_or_default(),
        };

        let cells = entries
            .iter()
            .map(|entry| HourCell::from_entry(entry, prefs))
            .collect::<Result<Vec<_>, _>>()?;
        let temperatures = entries
            .iter()
            .map(|entry| entry.weather().readings().temperature)
            .collect();

        Ok(Self {
            label,
            cells,
            temperatures,
        })
    }
}

/// Everything the interface shows for one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub current: CurrentPanel,
    /// `None` when the forecast is disabled or unavailable
    pub today: Option<TodayStrip>,
    pub days: Vec<ForecastDay>,
}

impl PanelView {
    pub fn build(
        snapshot: &WeatherSnapshot,
        settings: &Settings,
        location: &str,
        now: DateTime<Utc>,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, UnitError> {
        let current = CurrentPanel::build(snapshot, settings, location, now, last_updated)?;

        let grid = snapshot.forecast().filter(|_| !settings.disable_forecast);
        let (today, days) = match grid {
            Some(grid) => (
                Some(TodayStrip::build(
                    grid,
                    snapshot.utc_offset(),
                    &settings.units,
                    now,
                )?),
                ForecastDay::build_all(grid, &settings.units)?,
            ),
            None => (None, Vec::new()),
        };

        Ok(Self {
            current,
            today,
            days,
        })
    }
}

/// Plain-text report for `--once`
pub fn render_report(view: &PanelView, prefs: &UnitPreferences) -> Result<String, UnitError> {
    let current = &view.current;
    let mut lines = vec![
        current.location.clone(),
        current.summary.clone(),
        format!(
            "Feels like {} | Humidity {} | Pressure {}",
            current.feels_like, current.humidity, current.pressure
        ),
    ];

    let mut wind = format!("Wind {}", current.wind);
    if let Some(gusts) = &current.gusts {
        wind.push_str(&format!(" | Gusts {}", gusts));
    }
    lines.push(wind);
    lines.push(format!("Sunrise {} | Sunset {}", current.sunrise, current.sunset));
    lines.push(format!("Updated {}", current.last_updated));

    if let Some(today) = &view.today {
        lines.push(String::new());
        lines.push("Next hours".to_string());
        for cell in today.cells.iter().filter(|cell| !cell.is_placeholder()) {
            let mut line = format!("  {:<9}{:<8}{}", cell.time, cell.temperature, cell.condition);
            if let Some(precipitation) = &cell.precipitation {
                line.push_str(&format!("  {}", precipitation));
            }
            lines.push(line);
        }
    }

    if !view.days.is_empty() {
        lines.push(String::new());
        for day in &view.days {
            let low = day.temperatures.iter().copied().fold(f64::INFINITY, f64::min);
            let high = day.temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            lines.push(format!(
                "{:<10}{} .. {}",
                day.label,
                units::format_temperature(low, prefs)?,
                units::format_temperature(high, prefs)?
            ));
        }
    }

    Ok(lines.join("\n"))
}
