//! Application state management for meteopanel
//!
//! This module holds the interface state, applies messages from the
//! background refresher, and handles keyboard input.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use tokio::sync::watch;

use crate::cache::{StoredSnapshot, WeatherCache};
use crate::data::WeatherSnapshot;
use crate::panel::PanelView;
use crate::refresh::RefreshMessage;
use crate::settings::Settings;
use crate::units::UnitError;

/// Maximum scroll offset of the forecast day view
const MAX_SCROLL: u16 = 24;

/// Application state enum representing what the main area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// No snapshot yet, first fetch in progress
    Loading,
    /// A snapshot is available
    Ready,
    /// No snapshot and the last fetch failed
    Unavailable(String),
}

/// Main application struct managing state and data
pub struct App {
    pub state: AppState,
    pub settings: Settings,
    /// Name of the shown location, before truncation
    pub location_name: String,
    /// Shared slot the refresher writes to
    slot: watch::Receiver<Option<StoredSnapshot>>,
    /// A fetch is in progress
    pub refreshing: bool,
    /// Problem reported by the last refresh, shown in the footer
    pub status: Option<String>,
    /// Index of the forecast day shown below the hourly strip
    pub selected_day: usize,
    /// Scroll offset of the forecast day view
    pub scroll_offset: u16,
    pub show_help: bool,
    pub should_quit: bool,
    /// Flag indicating a refresh has been requested
    pub refresh_requested: bool,
}

impl App {
    /// Creates the app reading snapshots from `cache`
    pub fn new(settings: Settings, cache: &WeatherCache) -> Self {
        let location_name = settings
            .active_location()
            .map(|location| location.display_name())
            .unwrap_or_default();

        let mut app = Self {
            state: AppState::Loading,
            settings,
            location_name,
            slot: cache.subscribe(),
            refreshing: false,
            status: None,
            selected_day: 0,
            scroll_offset: 0,
            show_help: false,
            should_quit: false,
            refresh_requested: false,
        };
        app.sync_snapshot();
        app
    }

    /// Snapshot currently in the slot
    pub fn snapshot(&self) -> Option<Arc<WeatherSnapshot>> {
        self.slot
            .borrow()
            .as_ref()
            .map(|stored| Arc::clone(&stored.snapshot))
    }

    /// When the snapshot in the slot was fetched
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.slot.borrow().as_ref().map(|stored| stored.fetched_at)
    }

    /// Picks up a snapshot stored since the last call
    pub fn sync_snapshot(&mut self) {
        if self.slot.borrow_and_update().is_some() {
            self.state = AppState::Ready;
        }
        self.selected_day = self.selected_day.min(self.day_count().saturating_sub(1));
    }

    /// Applies a message from the background refresher
    ///
    /// Failures keep the previous snapshot on screen.
    pub fn apply_message(&mut self, message: RefreshMessage) {
        match message {
            RefreshMessage::RefreshStarted => {
                self.refreshing = true;
            }
            RefreshMessage::WeatherUpdated => {
                self.refreshing = false;
                self.status = None;
                self.sync_snapshot();
            }
            RefreshMessage::NoData => {
                self.refreshing = false;
                self.report_failure("No data from the weather service".to_string());
            }
            RefreshMessage::RefreshError(reason) => {
                self.refreshing = false;
                self.report_failure(reason);
            }
        }
    }

    fn report_failure(&mut self, reason: String) {
        if self.slot.borrow().is_none() {
            self.state = AppState::Unavailable(reason.clone());
        }
        self.status = Some(reason);
    }

    /// Number of forecast days with data in the shown snapshot
    pub fn day_count(&self) -> usize {
        if self.settings.disable_forecast {
            return 0;
        }
        self.snapshot()
            .and_then(|snapshot| {
                snapshot
                    .forecast()
                    .map(|grid| grid.days().filter(|day| !day.is_empty()).count())
            })
            .unwrap_or(0)
    }

    /// View models for the shown snapshot, if any
    pub fn view(&self, now: DateTime<Utc>) -> Option<Result<PanelView, UnitError>> {
        let stored = self.slot.borrow().clone()?;
        Some(PanelView::build(
            &stored.snapshot,
            &self.settings,
            &self.location_name,
            now,
            stored.fetched_at,
        ))
    }

    /// Handles keyboard input
    ///
    /// - `q` or `Esc`: Quit the application
    /// - `r`: Request an immediate refresh
    /// - `Left`/`h`, `Right`/`l`: Previous/next forecast day
    /// - `Up`/`k`, `Down`/`j`: Scroll the forecast day
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Left | KeyCode::Char('h') => self.previous_day(),
            KeyCode::Right | KeyCode::Char('l') => self.next_day(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            _ => {}
        }
    }

    fn previous_day(&mut self) {
        if self.selected_day > 0 {
            self.selected_day -= 1;
            self.scroll_offset = 0;
        }
    }

    fn next_day(&mut self) {
        if self.selected_day + 1 < self.day_count() {
            self.selected_day += 1;
            self.scroll_offset = 0;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < MAX_SCROLL {
            self.scroll_offset += 1;
        }
    }
}
