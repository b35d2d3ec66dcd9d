//! UI rendering module for meteopanel
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod panel_view;
pub mod widgets;

use chrono::{DateTime, Utc};
use ratatui::{style::Color, Frame};

use crate::app::{App, AppState};

/// Renders the UI based on the current application state
pub fn render(frame: &mut Frame, app: &App, now: DateTime<Utc>) {
    match &app.state {
        AppState::Loading => {
            panel_view::render_message(frame, "Loading weather...", Color::Cyan);
        }
        AppState::Unavailable(reason) => {
            panel_view::render_message(
                frame,
                &format!("Weather unavailable: {}  (r to retry, q to quit)", reason),
                Color::Red,
            );
        }
        AppState::Ready => {
            panel_view::render_app(frame, app, now);
        }
    }

    if app.show_help {
        help_overlay::render(frame);
    }
}
