//! Core data models for WeatherNow
//!
//! This module contains the location and weather types shared by the search
//! pipeline, the dashboard state, and the renderer, plus the Open-Meteo
//! clients that produce them.

pub mod geocode;
pub mod weather;

pub use geocode::{format_display_name, GeocodeClient, GeocodeError, SuggestionSource};
pub use weather::{
    DailyForecast, Forecast, ForecastClient, ForecastSource, HourlyForecast, WeatherError,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A place the dashboard can show weather for
///
/// Two locations are the same favourite when their names match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name
    pub name: String,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
    /// Country, when known
    pub country: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Location shown on first start
pub fn default_location() -> Location {
    Location::new("San Francisco", 37.7749, -122.4194).with_country("US")
}

/// Favourites every session starts with
pub fn default_favorites() -> Vec<Location> {
    vec![
        Location::new("Denver", 39.7392, -104.9903),
        Location::new("Bali", -8.4095, 115.1889),
        Location::new("Tokyo", 35.6762, 139.6503),
    ]
}

/// A search candidate with a pre-formatted display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// "City[, Region][, Country]"
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Suggestion {
    pub fn to_location(&self) -> Location {
        Location::new(self.name.clone(), self.latitude, self.longitude)
    }
}

/// Current conditions reported with a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// WMO weather code
    pub weather_code: u8,
    /// Observation time, local to the location
    pub time: NaiveDateTime,
}
