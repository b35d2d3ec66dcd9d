//! Forecast horizon and hourly strip selection
//!
//! Decides how many days a grid spans and which four hour slots the compact
//! "today" strip shows for a given moment.

use chrono::{DateTime, Duration, FixedOffset, Timelike};

use crate::data::{ForecastEntry, ForecastGrid};

/// Number of entries in the compact hourly strip
pub const WINDOW_SIZE: usize = 4;

/// Largest number of extra days after today
pub const MAX_EXTRA_DAYS: i32 = 7;

/// Number of grid days for a requested number of extra days (today plus 0-7)
pub fn forecast_day_count(requested_extra_days: i32) -> usize {
    (requested_extra_days.clamp(0, MAX_EXTRA_DAYS) + 1) as usize
}

/// `now` rounded up to the next whole hour; already-aligned times are kept
pub fn aligned_hour(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let floor = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    if floor == now {
        now
    } else {
        floor + Duration::hours(1)
    }
}

/// Selects up to [`WINDOW_SIZE`] entries for the hourly strip
///
/// Scans day-major, hour-minor. The first entry starting at or after the
/// aligned hour opens the window, and every entry after it is taken in scan
/// order until the window is full. If nothing qualifies, the first entries
/// of day 0 are used instead.
pub fn select_window(grid: &ForecastGrid, now: DateTime<FixedOffset>) -> Vec<&ForecastEntry> {
    let aligned = aligned_hour(now);

    let window: Vec<&ForecastEntry> = grid
        .entries()
        .skip_while(|entry| entry.start() < aligned)
        .take(WINDOW_SIZE)
        .collect();

    if !window.is_empty() {
        return window;
    }

    grid.day(0)
        .map(|day| day.iter().take(WINDOW_SIZE).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{at, grid, hour_snapshot};
    use crate::data::Precipitation;

    fn starts(window: &[&ForecastEntry]) -> Vec<DateTime<FixedOffset>> {
        window.iter().map(|entry| entry.start()).collect()
    }

    #[test]
    fn test_forecast_day_count_clamps() {
        assert_eq!(forecast_day_count(-1), 1);
        assert_eq!(forecast_day_count(0), 1);
        assert_eq!(forecast_day_count(3), 4);
        assert_eq!(forecast_day_count(7), 8);
        assert_eq!(forecast_day_count(30), 8);
    }

    #[test]
    fn test_aligned_hour_rounds_up() {
        assert_eq!(aligned_hour(at(15, 2, 30)), at(15, 3, 0));
        assert_eq!(aligned_hour(at(15, 23, 1)), at(16, 0, 0));
    }

    #[test]
    fn test_aligned_hour_keeps_exact_hour() {
        assert_eq!(aligned_hour(at(15, 3, 0)), at(15, 3, 0));
    }

    #[test]
    fn test_aligned_hour_rounds_up_on_seconds() {
        let now = at(15, 3, 0) + Duration::seconds(1);
        assert_eq!(aligned_hour(now), at(15, 4, 0));
    }

    #[test]
    fn test_window_starts_at_next_hour() {
        let grid = grid(&[24, 24]);
        let window = select_window(&grid, at(15, 2, 30));

        assert_eq!(
            starts(&window),
            vec![at(15, 3, 0), at(15, 4, 0), at(15, 5, 0), at(15, 6, 0)]
        );
    }

    #[test]
    fn test_window_crosses_day_boundary() {
        let grid = grid(&[24, 24]);
        let window = select_window(&grid, at(15, 21, 10));

        assert_eq!(
            starts(&window),
            vec![at(15, 22, 0), at(15, 23, 0), at(16, 0, 0), at(16, 1, 0)]
        );
    }

    #[test]
    fn test_window_is_idempotent_within_an_hour() {
        let grid = grid(&[24, 24]);
        let first = select_window(&grid, at(15, 9, 5));
        let second = select_window(&grid, at(15, 9, 55));

        assert_eq!(starts(&first), starts(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_window_is_short_near_end_of_data() {
        let grid = grid(&[24, 6]);
        let window = select_window(&grid, at(16, 3, 20));

        assert_eq!(starts(&window), vec![at(16, 4, 0), at(16, 5, 0)]);
    }

    #[test]
    fn test_window_keeps_entries_after_start_even_if_earlier() {
        // Day 1 carries a gap back in time; once the window opens it is kept
        let day0 = vec![
            ForecastEntry::new(at(15, 10, 0), hour_snapshot(1.0, Precipitation::default())),
            ForecastEntry::new(at(15, 11, 0), hour_snapshot(2.0, Precipitation::default())),
        ];
        let day1 = vec![
            ForecastEntry::new(at(15, 8, 0), hour_snapshot(3.0, Precipitation::default())),
            ForecastEntry::new(at(15, 9, 0), hour_snapshot(4.0, Precipitation::default())),
            ForecastEntry::new(at(15, 12, 0), hour_snapshot(5.0, Precipitation::default())),
        ];
        let grid = ForecastGrid::new(vec![day0, day1]).unwrap();

        let window = select_window(&grid, at(15, 10, 30));
        assert_eq!(
            starts(&window),
            vec![at(15, 11, 0), at(15, 8, 0), at(15, 9, 0), at(15, 12, 0)]
        );
    }

    #[test]
    fn test_window_falls_back_to_first_entries_of_day_zero() {
        let grid = grid(&[24, 24]);
        let window = select_window(&grid, at(20, 12, 0));

        assert_eq!(
            starts(&window),
            vec![at(15, 0, 0), at(15, 1, 0), at(15, 2, 0), at(15, 3, 0)]
        );
    }

    #[test]
    fn test_fallback_with_short_day_zero() {
        let grid = grid(&[2]);
        let window = select_window(&grid, at(20, 12, 0));
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_window_on_empty_grid() {
        let grid = ForecastGrid::new(vec![]).unwrap();
        assert!(select_window(&grid, at(15, 12, 0)).is_empty());
    }
}
