//! Open-Meteo forecast client
//!
//! This module fetches current conditions, hourly and daily forecasts from the
//! Open-Meteo API and converts the parallel-array response into row types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Location, WeatherSnapshot};

/// Base URL for the Open-Meteo API
const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_FIELDS: &str =
    "temperature_2m,apparent_temperature,precipitation,weathercode,windspeed_10m,relative_humidity_2m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,sunrise,sunset,weathercode";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Hourly forecast for a single hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Start of the hour, local to the location
    pub time: NaiveDateTime,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Feels-like temperature in Celsius
    pub apparent_temperature: Option<f64>,
    /// Precipitation in mm
    pub precipitation: f64,
    /// WMO weather code
    pub weather_code: u8,
    /// Relative humidity percentage (0-100)
    pub humidity: Option<f64>,
    /// Wind speed in km/h
    pub wind_speed: Option<f64>,
}

/// Forecast for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Maximum temperature in Celsius
    pub temperature_max: f64,
    /// Minimum temperature in Celsius
    pub temperature_min: f64,
    /// WMO weather code
    pub weather_code: u8,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
}

/// A complete forecast for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Current conditions
    pub current: WeatherSnapshot,
    /// Hourly forecasts, one per hour in time order
    pub hourly: Vec<HourlyForecast>,
    /// Daily forecasts, one per day in date order
    pub daily: Vec<DailyForecast>,
    /// IANA timezone the times are expressed in
    pub timezone: Option<String>,
}

impl Forecast {
    /// Index of the hourly slot covering the current observation
    ///
    /// Returns the first slot at or after the start of the current hour, or 0
    /// when every slot is earlier.
    pub fn current_hour_index(&self) -> usize {
        let current = &self.current.time;
        let hour_start = current
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .unwrap_or(*current);
        self.hourly
            .iter()
            .position(|h| h.time >= hour_start)
            .unwrap_or(0)
    }

    /// Hourly slots starting at the current hour, at most `len` of them
    pub fn upcoming_hours(&self, len: usize) -> &[HourlyForecast] {
        let start = self.current_hour_index().min(self.hourly.len());
        let end = (start + len).min(self.hourly.len());
        &self.hourly[start..end]
    }

    /// Temperatures of the next `len` hours, for the curve
    pub fn temperature_window(&self, len: usize) -> Vec<f64> {
        self.upcoming_hours(len)
            .iter()
            .map(|h| h.temperature)
            .collect()
    }

    /// The slot describing the current hour, if any
    pub fn current_hour(&self) -> Option<&HourlyForecast> {
        self.upcoming_hours(1).first()
    }
}

/// Errors that can occur when fetching forecast data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Forecast service returned status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Parallel arrays in the response have different lengths
    #[error("Series '{0}' does not match the length of its time axis")]
    InconsistentSeries(String),

    /// Invalid time format in response
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),
}

/// Anything that can produce a forecast for a location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Returns the forecast, or `None` when it could not be fetched.
    async fn forecast(&self, location: &Location) -> Option<Forecast>;
}

/// Client for fetching forecasts from the Open-Meteo API
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastClient {
    /// Create a new ForecastClient with default settings
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self::with_client(client)
    }

    /// Create a new ForecastClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different server (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the forecast for the given coordinates
    ///
    /// # Arguments
    /// * `lat` - Latitude coordinate
    /// * `lon` - Longitude coordinate
    ///
    /// # Returns
    /// * `Ok(Forecast)` - Current, hourly and daily data for the location
    /// * `Err(WeatherError)` - If the request or parsing fails
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<Forecast, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        let api_response: OpenMeteoResponse = serde_json::from_str(&text)?;

        parse_response(api_response)
    }
}

#[async_trait]
impl ForecastSource for ForecastClient {
    async fn forecast(&self, location: &Location) -> Option<Forecast> {
        match self
            .fetch_forecast(location.latitude, location.longitude)
            .await
        {
            Ok(forecast) => {
                tracing::info!(location = %location.name, hours = forecast.hourly.len(), "forecast loaded");
                Some(forecast)
            }
            Err(e) => {
                tracing::warn!(location = %location.name, error = %e, "forecast fetch failed");
                None
            }
        }
    }
}

/// Parse the Open-Meteo API response into a Forecast
fn parse_response(response: OpenMeteoResponse) -> Result<Forecast, WeatherError> {
    let current = response.current_weather;
    let current = WeatherSnapshot {
        temperature: current.temperature,
        wind_speed: current.windspeed,
        weather_code: current.weathercode,
        time: parse_datetime(&current.time)?,
    };

    Ok(Forecast {
        current,
        hourly: parse_hourly_data(&response.hourly)?,
        daily: parse_daily_data(&response.daily)?,
        timezone: response.timezone,
    })
}

/// Checks a parallel array against the time axis length.
///
/// Optional series may be absent entirely (empty); present ones must match.
fn check_len<T>(name: &str, values: &[T], len: usize, optional: bool) -> Result<(), WeatherError> {
    if values.len() == len || (optional && values.is_empty()) {
        Ok(())
    } else {
        Err(WeatherError::InconsistentSeries(name.to_string()))
    }
}

fn value_at<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

fn required_at(values: &[Option<f64>], i: usize, name: &str) -> Result<f64, WeatherError> {
    value_at(values, i).ok_or_else(|| WeatherError::MissingField(format!("{}[{}]", name, i)))
}

/// Parse hourly weather data arrays into HourlyForecast rows
fn parse_hourly_data(hourly: &HourlyWeather) -> Result<Vec<HourlyForecast>, WeatherError> {
    let len = hourly.time.len();

    check_len("hourly.temperature_2m", &hourly.temperature_2m, len, false)?;
    check_len("hourly.apparent_temperature", &hourly.apparent_temperature, len, true)?;
    check_len("hourly.precipitation", &hourly.precipitation, len, true)?;
    check_len("hourly.weathercode", &hourly.weathercode, len, true)?;
    check_len("hourly.windspeed_10m", &hourly.windspeed_10m, len, true)?;
    check_len("hourly.relative_humidity_2m", &hourly.relative_humidity_2m, len, true)?;

    let mut forecasts = Vec::with_capacity(len);

    for (i, time) in hourly.time.iter().enumerate() {
        forecasts.push(HourlyForecast {
            time: parse_datetime(time)?,
            temperature: required_at(&hourly.temperature_2m, i, "hourly.temperature_2m")?,
            apparent_temperature: value_at(&hourly.apparent_temperature, i),
            precipitation: value_at(&hourly.precipitation, i).unwrap_or(0.0),
            weather_code: value_at(&hourly.weathercode, i).unwrap_or(0),
            humidity: value_at(&hourly.relative_humidity_2m, i),
            wind_speed: value_at(&hourly.windspeed_10m, i),
        });
    }

    Ok(forecasts)
}

/// Parse daily weather data arrays into DailyForecast rows
fn parse_daily_data(daily: &DailyWeather) -> Result<Vec<DailyForecast>, WeatherError> {
    let len = daily.time.len();

    check_len("daily.temperature_2m_max", &daily.temperature_2m_max, len, false)?;
    check_len("daily.temperature_2m_min", &daily.temperature_2m_min, len, false)?;
    check_len("daily.weathercode", &daily.weathercode, len, true)?;
    check_len("daily.sunrise", &daily.sunrise, len, true)?;
    check_len("daily.sunset", &daily.sunset, len, true)?;

    let mut forecasts = Vec::with_capacity(len);

    for (i, date) in daily.time.iter().enumerate() {
        let sunrise = match daily.sunrise.get(i).and_then(Option::as_deref) {
            Some(s) => Some(parse_datetime(s)?),
            None => None,
        };
        let sunset = match daily.sunset.get(i).and_then(Option::as_deref) {
            Some(s) => Some(parse_datetime(s)?),
            None => None,
        };

        forecasts.push(DailyForecast {
            date: parse_date(date)?,
            temperature_max: required_at(&daily.temperature_2m_max, i, "daily.temperature_2m_max")?,
            temperature_min: required_at(&daily.temperature_2m_min, i, "daily.temperature_2m_min")?,
            weather_code: value_at(&daily.weathercode, i).unwrap_or(0),
            sunrise,
            sunset,
        });
    }

    Ok(forecasts)
}

/// Parse a datetime string in ISO 8601 format (e.g., "2024-07-15T05:30") to NaiveDateTime
fn parse_datetime(datetime_str: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%dT%H:%M")
        .map_err(|_| WeatherError::InvalidTimeFormat(datetime_str.to_string()))
}

/// Parse a date string (e.g., "2024-07-15") to NaiveDate
fn parse_date(date_str: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| WeatherError::InvalidTimeFormat(date_str.to_string()))
}

/// Open-Meteo API response structure
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    timezone: Option<String>,
    current_weather: CurrentWeather,
    hourly: HourlyWeather,
    daily: DailyWeather,
}

/// `current_weather` block from Open-Meteo
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    time: String,
    temperature: f64,
    windspeed: f64,
    weathercode: u8,
}

/// Hourly weather data from Open-Meteo
#[derive(Debug, Deserialize)]
struct HourlyWeather {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<u8>>,
    #[serde(default)]
    windspeed_10m: Vec<Option<f64>>,
    #[serde(default, alias = "relativehumidity_2m")]
    relative_humidity_2m: Vec<Option<f64>>,
}

/// Daily weather data from Open-Meteo
#[derive(Debug, Deserialize)]
struct DailyWeather {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<u8>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Sample valid Open-Meteo API response
    const VALID_RESPONSE: &str = r#"{
        "latitude": 37.763283,
        "longitude": -122.41286,
        "generationtime_ms": 0.2,
        "utc_offset_seconds": -25200,
        "timezone": "America/Los_Angeles",
        "timezone_abbreviation": "PDT",
        "elevation": 18.0,
        "current_weather": {
            "temperature": 17.3,
            "windspeed": 14.2,
            "winddirection": 260,
            "weathercode": 2,
            "is_day": 1,
            "time": "2024-07-15T14:15"
        },
        "hourly": {
            "time": [
                "2024-07-15T12:00", "2024-07-15T13:00", "2024-07-15T14:00",
                "2024-07-15T15:00", "2024-07-15T16:00", "2024-07-15T17:00"
            ],
            "temperature_2m": [15.2, 16.4, 17.1, 17.8, 17.0, 16.1],
            "apparent_temperature": [14.0, 15.1, 16.2, 16.9, null, 15.0],
            "precipitation": [0.0, 0.0, 0.2, null, 1.4, 0.0],
            "weathercode": [1, 2, 2, 3, 61, 3],
            "windspeed_10m": [10.1, 12.0, 14.2, 15.0, 13.3, 11.8],
            "relative_humidity_2m": [70, 68, 66, 65, 72, 74]
        },
        "daily": {
            "time": ["2024-07-15", "2024-07-16"],
            "weathercode": [3, 61],
            "temperature_2m_max": [18.2, 16.9],
            "temperature_2m_min": [12.1, 11.4],
            "sunrise": ["2024-07-15T06:04", "2024-07-16T06:05"],
            "sunset": ["2024-07-15T20:31", "2024-07-16T20:30"]
        }
    }"#;

    fn valid_forecast() -> Forecast {
        let response: OpenMeteoResponse =
            serde_json::from_str(VALID_RESPONSE).expect("Failed to parse valid response");
        parse_response(response).expect("Failed to parse forecast")
    }

    #[test]
    fn test_parse_valid_response() {
        let forecast = valid_forecast();

        assert!((forecast.current.temperature - 17.3).abs() < 0.01);
        assert!((forecast.current.wind_speed - 14.2).abs() < 0.01);
        assert_eq!(forecast.current.weather_code, 2);
        assert_eq!(forecast.current.time, parse_datetime("2024-07-15T14:15").unwrap());
        assert_eq!(forecast.timezone.as_deref(), Some("America/Los_Angeles"));
        assert_eq!(forecast.hourly.len(), 6);
        assert_eq!(forecast.daily.len(), 2);
    }

    #[test]
    fn test_hourly_nulls_use_boundary_defaults() {
        let forecast = valid_forecast();

        // null precipitation defaults to 0
        assert!((forecast.hourly[3].precipitation - 0.0).abs() < 0.01);
        // null apparent temperature stays absent
        assert!(forecast.hourly[4].apparent_temperature.is_none());
        assert_eq!(forecast.hourly[4].weather_code, 61);
        assert_eq!(forecast.hourly[5].humidity, Some(74.0));
    }

    #[test]
    fn test_daily_fields_correctly_extracted() {
        let forecast = valid_forecast();
        let day = &forecast.daily[1];

        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 7, 16).unwrap());
        assert!((day.temperature_max - 16.9).abs() < 0.01);
        assert!((day.temperature_min - 11.4).abs() < 0.01);
        assert_eq!(day.weather_code, 61);
        assert_eq!(day.sunrise, Some(parse_datetime("2024-07-16T06:05").unwrap()));
        assert_eq!(day.sunset, Some(parse_datetime("2024-07-16T20:30").unwrap()));
    }

    #[test]
    fn test_current_hour_index() {
        let forecast = valid_forecast();
        // 14:15 falls in the 14:00 slot
        assert_eq!(forecast.current_hour_index(), 2);
        assert_eq!(forecast.current_hour().map(|h| h.temperature), Some(17.1));
    }

    #[test]
    fn test_current_hour_index_falls_back_to_start() {
        let mut forecast = valid_forecast();
        forecast.current.time = parse_datetime("2024-07-20T09:00").unwrap();
        assert_eq!(forecast.current_hour_index(), 0);
    }

    #[test]
    fn test_temperature_window_starts_at_current_hour() {
        let forecast = valid_forecast();
        assert_eq!(forecast.temperature_window(3), vec![17.1, 17.8, 17.0]);
        // Window is clipped to the available hours
        assert_eq!(forecast.temperature_window(24).len(), 4);
        assert_eq!(forecast.upcoming_hours(0).len(), 0);
    }

    #[test]
    fn test_parse_hourly_with_inconsistent_array_lengths() {
        let hourly = HourlyWeather {
            time: vec!["2024-07-15T00:00".to_string(), "2024-07-15T01:00".to_string()],
            temperature_2m: vec![Some(15.0), Some(14.0)],
            apparent_temperature: vec![],
            precipitation: vec![Some(0.0)], // Only 1 element instead of 2
            weathercode: vec![Some(0), Some(0)],
            windspeed_10m: vec![],
            relative_humidity_2m: vec![],
        };

        match parse_hourly_data(&hourly) {
            Err(WeatherError::InconsistentSeries(name)) => {
                assert_eq!(name, "hourly.precipitation");
            }
            other => panic!("Expected InconsistentSeries error, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_optional_series_default() {
        let hourly = HourlyWeather {
            time: vec!["2024-07-15T00:00".to_string()],
            temperature_2m: vec![Some(15.0)],
            apparent_temperature: vec![],
            precipitation: vec![],
            weathercode: vec![],
            windspeed_10m: vec![],
            relative_humidity_2m: vec![],
        };

        let rows = parse_hourly_data(&hourly).expect("Failed to parse hourly");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weather_code, 0);
        assert!((rows[0].precipitation - 0.0).abs() < 0.01);
        assert!(rows[0].humidity.is_none());
    }

    #[test]
    fn test_null_temperature_is_missing_field() {
        let hourly = HourlyWeather {
            time: vec!["2024-07-15T00:00".to_string()],
            temperature_2m: vec![None],
            apparent_temperature: vec![],
            precipitation: vec![],
            weathercode: vec![],
            windspeed_10m: vec![],
            relative_humidity_2m: vec![],
        };

        match parse_hourly_data(&hourly) {
            Err(WeatherError::MissingField(field)) => {
                assert_eq!(field, "hourly.temperature_2m[0]");
            }
            other => panic!("Expected MissingField error, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_humidity_name_accepted() {
        let json = r#"{
            "time": ["2024-07-15T00:00"],
            "temperature_2m": [15.0],
            "relativehumidity_2m": [81]
        }"#;
        let hourly: HourlyWeather = serde_json::from_str(json).expect("Failed to parse");
        let rows = parse_hourly_data(&hourly).expect("Failed to parse hourly");
        assert_eq!(rows[0].humidity, Some(81.0));
    }

    #[test]
    fn test_parse_malformed_json() {
        let result: Result<OpenMeteoResponse, _> = serde_json::from_str("{ invalid json }");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_current_weather() {
        let missing_current = r#"{
            "hourly": {"time": [], "temperature_2m": []},
            "daily": {"time": [], "temperature_2m_max": [], "temperature_2m_min": []}
        }"#;
        let result: Result<OpenMeteoResponse, _> = serde_json::from_str(missing_current);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("2024-07-15 14:30").is_err());
        assert!(parse_datetime("not a datetime").is_err());
        assert!(parse_date("15/07/2024").is_err());
    }

    #[tokio::test]
    async fn test_fetch_forecast_from_server() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("latitude", "37.7749"))
            .and(query_param("longitude", "-122.4194"))
            .and(query_param("current_weather", "true"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RESPONSE))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::new().with_base_url(mock_server.uri());
        let forecast = client.fetch_forecast(37.7749, -122.4194).await.unwrap();
        assert_eq!(forecast.hourly.len(), 6);

        let location = Location::new("San Francisco", 37.7749, -122.4194);
        assert!(client.forecast(&location).await.is_some());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_absent_forecast() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::new().with_base_url(mock_server.uri());
        assert!(matches!(
            client.fetch_forecast(0.0, 0.0).await,
            Err(WeatherError::Status(503))
        ));
        assert!(client.forecast(&Location::new("Nowhere", 0.0, 0.0)).await.is_none());
    }
}
