//! WeatherNow Library
//!
//! Weather classification and theming, temperature curve geometry, debounced
//! city search and the dashboard built on them. The binary in `main.rs` only
//! wires these to the terminal.

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod logging;
pub mod refresh;
pub mod search;
pub mod theme;
pub mod ui;
