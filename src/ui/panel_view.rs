//! Weather panel screen rendering
//!
//! Renders the current conditions, the hourly strip, and the selected
//! forecast day from the [`PanelView`] models.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets::sparkline::TemperatureSparkline;
use crate::app::App;
use crate::panel::{CurrentPanel, ForecastDay, HourCell, PanelView, SunEvent, TodayStrip};

/// Terminal glyph for a themed icon identifier
pub fn icon_glyph(identifier: &str) -> &'static str {
    let night = identifier.contains("-night");
    let name = identifier
        .trim_end_matches("-symbolic")
        .trim_end_matches("-night");

    match name {
        "weather-clear" if night => "\u{1F319}",        // 🌙
        "weather-clear" => "\u{2600}",                  // ☀
        "weather-few-clouds" if night => "\u{2601}",    // ☁
        "weather-few-clouds" => "\u{26C5}",             // ⛅
        "weather-overcast" => "\u{2601}",               // ☁
        "weather-fog" => "\u{1F32B}",                   // 🌫
        "weather-showers-scattered" => "\u{1F326}",     // 🌦
        "weather-showers" | "weather-freezing-rain" => "\u{1F327}", // 🌧
        "weather-snow" => "\u{2744}",                   // ❄
        "weather-storm" => "\u{26C8}",                  // ⛈
        _ => "\u{21BB}",                                // ↻
    }
}

/// Color for temperature (warmer = more red, cooler = more blue)
fn temperature_color(celsius: f64) -> Color {
    if celsius >= 30.0 {
        Color::Red
    } else if celsius >= 20.0 {
        Color::Yellow
    } else if celsius >= 10.0 {
        Color::Green
    } else if celsius >= 0.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

/// Renders the panel screen
pub fn render(frame: &mut Frame, app: &App, view: &PanelView) {
    let has_forecast = view.today.is_some();

    let constraints = if has_forecast {
        vec![
            Constraint::Length(3), // Header
            Constraint::Length(6), // Current details
            Constraint::Length(6), // Hourly strip
            Constraint::Min(4),    // Forecast day
            Constraint::Length(1), // Footer
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(1),
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(frame, chunks[0], &view.current);
    render_details(frame, chunks[1], &view.current);

    if let Some(today) = &view.today {
        render_today(frame, chunks[2], today);
        render_day(frame, chunks[3], app, &view.days);
    }

    render_footer(frame, chunks[chunks.len() - 1], app, &view.current);
}

fn render_header(frame: &mut Frame, area: Rect, current: &CurrentPanel) {
    let sun_glyph = match current.sun_event {
        SunEvent::Sunrise(_) => "\u{1F305}", // 🌅
        SunEvent::Sunset(_) => "\u{1F307}",  // 🌇
    };

    let line = Line::from(vec![
        Span::raw(format!("{} ", icon_glyph(&current.icon))),
        Span::styled(
            current.location.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::raw(current.panel_text.clone()),
        Span::raw("   "),
        Span::styled(
            format!("{} {}", sun_glyph, current.sun_event.time()),
            Style::default().fg(Color::Yellow),
        ),
    ]);

    let block = Block::default()
        .title(" meteopanel ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_details(frame: &mut Frame, area: Rect, current: &CurrentPanel) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));

    let mut wind = vec![label("Wind "), Span::raw(current.wind.clone())];
    if let Some(gusts) = &current.gusts {
        wind.push(label("   Gusts "));
        wind.push(Span::raw(gusts.clone()));
    }

    let lines = vec![
        Line::from(Span::styled(
            current.summary.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            label("Feels like "),
            Span::raw(current.feels_like.clone()),
            label("   Humidity "),
            Span::raw(current.humidity.clone()),
            label("   Pressure "),
            Span::raw(current.pressure.clone()),
        ]),
        Line::from(wind),
        Line::from(vec![
            label("Sunrise "),
            Span::raw(current.sunrise.clone()),
            label("   Sunset "),
            Span::raw(current.sunset.clone()),
        ]),
    ];

    let block = Block::default().title(" Now ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn hour_cell_lines(cell: &HourCell) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            cell.time.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} {}", icon_glyph(&cell.icon), cell.temperature)),
        Line::from(cell.condition.clone()),
        Line::from(Span::styled(
            cell.precipitation.clone().unwrap_or_default(),
            Style::default().fg(Color::Blue),
        )),
    ]
}

fn render_today(frame: &mut Frame, area: Rect, today: &TodayStrip) {
    let block = Block::default().title(" Next hours ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, today.cells.len().max(1) as u32);
            today.cells.len()
        ])
        .split(inner);

    for (cell, column) in today.cells.iter().zip(columns.iter()) {
        frame.render_widget(Paragraph::new(hour_cell_lines(cell)), *column);
    }
}

fn render_day(frame: &mut Frame, area: Rect, app: &App, days: &[ForecastDay]) {
    let Some(day) = days.get(app.selected_day) else {
        return;
    };

    let title = format!(" {} ({}/{}) ", day.label, app.selected_day + 1, days.len());
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    frame.render_widget(TemperatureSparkline::new(&day.temperatures), rows[0]);

    let lines: Vec<Line> = day
        .cells
        .iter()
        .zip(day.temperatures.iter())
        .map(|(cell, celsius)| {
            Line::from(vec![
                Span::raw(format!("{:<9}", cell.time)),
                Span::raw(format!("{} ", icon_glyph(&cell.icon))),
                Span::styled(
                    format!("{:<8}", cell.temperature),
                    Style::default().fg(temperature_color(*celsius)),
                ),
                Span::raw(format!("{:<24}", cell.condition)),
                Span::styled(
                    cell.precipitation.clone().unwrap_or_default(),
                    Style::default().fg(Color::Blue),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).scroll((app.scroll_offset, 0)), rows[1]);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, current: &CurrentPanel) {
    let mut spans = vec![Span::styled(
        format!("Updated {}", current.last_updated),
        Style::default().fg(Color::DarkGray),
    )];

    if app.refreshing {
        spans.push(Span::styled(
            "  Refreshing...",
            Style::default().fg(Color::Cyan),
        ));
    } else if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::Red),
        ));
    }

    spans.push(Span::styled(
        "  ? help  q quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders a centered one-line message, used before the first snapshot
pub fn render_message(frame: &mut Frame, message: &str, color: Color) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(frame.area());

    let text = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .alignment(ratatui::layout::Alignment::Center);

    frame.render_widget(text, chunks[1]);
}

/// Builds the view for `now` and renders it, or an error line if a value cannot be shown
pub fn render_app(frame: &mut Frame, app: &App, now: DateTime<Utc>) {
    match app.view(now) {
        Some(Ok(view)) => render(frame, app, &view),
        Some(Err(e)) => {
            render_message(frame, &format!("Cannot display weather: {}", e), Color::Red)
        }
        None => render_message(frame, "Waiting for weather data...", Color::Cyan),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::WeatherCache;
    use crate::data::test_support::{at, current_snapshot, grid};
    use crate::settings::{Location, Settings};
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &App, now: DateTime<Utc>) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_app(frame, app, now)).unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with(days: &[usize]) -> App {
        let cache = WeatherCache::new();
        cache.store(
            current_snapshot(Some(grid(days))),
            at(15, 9, 20).with_timezone(&Utc),
        );

        let settings = Settings {
            locations: vec![Location::coordinates(
                49.28,
                -123.12,
                Some("Vancouver".to_string()),
            )],
            ..Settings::default()
        };
        App::new(settings, &cache)
    }

    #[test]
    fn test_icon_glyph() {
        assert_eq!(icon_glyph("weather-clear-symbolic"), "\u{2600}");
        assert_eq!(icon_glyph("weather-clear-night-symbolic"), "\u{1F319}");
        assert_eq!(icon_glyph("weather-storm-symbolic"), "\u{26C8}");
        assert_eq!(icon_glyph("view-refresh-symbolic"), "\u{21BB}");
    }

    #[test]
    fn test_renders_current_and_hourly_strip() {
        let app = app_with(&[24, 24]);
        let content = rendered(&app, at(15, 9, 20).with_timezone(&Utc));

        assert!(content.contains("Vancouver"));
        assert!(content.contains("Partly cloudy, 22°C"));
        assert!(content.contains("Next hours"));
        assert!(content.contains("10:00"));
        assert!(content.contains("Today (1/2)"));
        assert!(content.contains("Updated 09:20"));
    }

    #[test]
    fn test_renders_selected_day() {
        let mut app = app_with(&[24, 24]);
        app.selected_day = 1;
        let content = rendered(&app, at(15, 9, 20).with_timezone(&Utc));
        assert!(content.contains("Tomorrow (2/2)"));
    }

    #[test]
    fn test_renders_waiting_message_without_snapshot() {
        let app = App::new(Settings::default(), &WeatherCache::new());
        let content = rendered(&app, Utc::now());
        assert!(content.contains("Waiting for weather data"));
    }

    #[test]
    fn test_renders_status_after_failure() {
        let mut app = app_with(&[24]);
        app.status = Some("No data from the weather service".to_string());
        let content = rendered(&app, at(15, 9, 20).with_timezone(&Utc));
        assert!(content.contains("No data from the weather service"));
    }
}
