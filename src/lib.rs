//! meteopanel library
//!
//! Weather model, Open-Meteo fetch pipeline, and display logic. The binary
//! adds the terminal interface on top; the modules are public for
//! integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod conditions;
pub mod data;
pub mod logging;
pub mod panel;
pub mod refresh;
pub mod selection;
pub mod settings;
pub mod ui;
pub mod units;
