//! UI rendering module for WeatherNow
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod dashboard;
pub mod help_overlay;
pub mod layout;
pub mod widgets;

pub use dashboard::render;
pub use help_overlay::render as render_help_overlay;
