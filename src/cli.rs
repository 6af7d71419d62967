//! Command-line interface parsing for WeatherNow
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated [`StartupConfig`].

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::{default_location, Location};
use crate::refresh::RefreshConfig;
use crate::search::DEFAULT_QUIET_PERIOD;

/// Longest accepted debounce quiet period in milliseconds
const MAX_DEBOUNCE_MS: u64 = 5000;

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    /// Latitude outside [-90, 90]
    #[error("Invalid latitude: {0}. Expected a value between -90 and 90")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180]
    #[error("Invalid longitude: {0}. Expected a value between -180 and 180")]
    InvalidLongitude(f64),

    /// Only part of a start location was given
    #[error("--lat and --lon must be given together (and are required with --name)")]
    IncompleteLocation,

    /// Debounce period out of range
    #[error("Invalid debounce: {0} ms. Expected 1 to 5000")]
    InvalidDebounce(u64),
}

/// WeatherNow - current conditions, hourly curve and weekly outlook
#[derive(Parser, Debug)]
#[command(name = "weathernow")]
#[command(about = "Terminal weather dashboard with city search")]
#[command(version)]
pub struct Cli {
    /// Display name for the start location
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Latitude of the start location
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the start location
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Quiet period before a search is sent, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 300)]
    pub debounce_ms: u64,

    /// Minutes between automatic forecast refreshes (0 disables)
    #[arg(long, value_name = "MINUTES", default_value_t = 10)]
    pub refresh_minutes: u64,

    /// Write logs to this file instead of the default data directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Location shown first
    pub location: Location,
    /// Search debounce quiet period
    pub quiet_period: Duration,
    /// Auto-refresh settings
    pub refresh: RefreshConfig,
    /// Explicit log file, if any
    pub log_file: Option<PathBuf>,
    /// Debug logging
    pub verbose: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            quiet_period: DEFAULT_QUIET_PERIOD,
            refresh: RefreshConfig::default(),
            log_file: None,
            verbose: false,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if a location or the debounce period is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let location = match (cli.lat, cli.lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(CliError::InvalidLatitude(lat));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(CliError::InvalidLongitude(lon));
                }
                let name = cli
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{:.4}, {:.4}", lat, lon));
                Location::new(name, lat, lon)
            }
            (None, None) if cli.name.is_none() => default_location(),
            _ => return Err(CliError::IncompleteLocation),
        };

        if cli.debounce_ms == 0 || cli.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(CliError::InvalidDebounce(cli.debounce_ms));
        }

        Ok(StartupConfig {
            location,
            quiet_period: Duration::from_millis(cli.debounce_ms),
            refresh: RefreshConfig::from_minutes(cli.refresh_minutes),
            log_file: cli.log_file.clone(),
            verbose: cli.verbose,
        })
    }
}
