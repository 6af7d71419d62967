//! Open-Meteo geocoding client
//!
//! Resolves free-text place names to candidate locations. Callers of
//! [`SuggestionSource`] never see errors: a failed lookup and a lookup with no
//! matches both produce an empty list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::Suggestion;

/// Base URL for the Open-Meteo geocoding API
const GEOCODING_BASE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Maximum number of candidates requested per query
pub const MAX_SUGGESTIONS: usize = 6;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur when searching for a place
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Geocoding service returned status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Anything that can turn a query into an ordered list of suggestions
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Returns up to [`MAX_SUGGESTIONS`] candidates; empty on failure.
    async fn suggest(&self, query: &str) -> Vec<Suggestion>;
}

/// Joins a place name with whichever of region and country are present.
pub fn format_display_name(name: &str, admin1: Option<&str>, country: Option<&str>) -> String {
    let mut display = name.to_string();
    for part in [admin1, country].into_iter().flatten() {
        display.push_str(", ");
        display.push_str(part);
    }
    display
}

/// Client for the Open-Meteo geocoding search endpoint
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
    language: String,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeClient {
    /// Create a new GeocodeClient with default settings
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self::with_client(client)
    }

    /// Create a new GeocodeClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: GEOCODING_BASE_URL.to_string(),
            language: "en".to_string(),
        }
    }

    /// Point the client at a different server (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search for places matching `query`
    ///
    /// # Returns
    /// * `Ok(Vec<Suggestion>)` - Up to [`MAX_SUGGESTIONS`] candidates, possibly empty
    /// * `Err(GeocodeError)` - If the request or parsing fails
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let count = MAX_SUGGESTIONS.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        let parsed: GeocodingResponse = serde_json::from_str(&text)?;
        Ok(parsed.into_suggestions())
    }
}

#[async_trait]
impl SuggestionSource for GeocodeClient {
    async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        match self.search(query).await {
            Ok(suggestions) => {
                tracing::debug!(query, count = suggestions.len(), "geocode search finished");
                suggestions
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "geocode search failed");
                Vec::new()
            }
        }
    }
}

/// Geocoding API response; `results` is omitted when nothing matched
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl GeocodingResponse {
    fn into_suggestions(self) -> Vec<Suggestion> {
        self.results
            .unwrap_or_default()
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|r| Suggestion {
                name: format_display_name(&r.name, r.admin1.as_deref(), r.country.as_deref()),
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_format_display_name_all_parts() {
        assert_eq!(
            format_display_name("Paris", Some("Île-de-France"), Some("France")),
            "Paris, Île-de-France, France"
        );
    }

    #[test]
    fn test_format_display_name_without_region() {
        assert_eq!(format_display_name("Paris", None, Some("France")), "Paris, France");
    }

    #[test]
    fn test_format_display_name_name_only() {
        assert_eq!(format_display_name("Paris", None, None), "Paris");
    }

    #[test]
    fn test_format_display_name_region_without_country() {
        assert_eq!(format_display_name("Springfield", Some("Illinois"), None), "Springfield, Illinois");
    }

    #[test]
    fn test_parse_results() {
        let json = r#"{
            "results": [
                {"id": 2988507, "name": "Paris", "latitude": 48.85341, "longitude": 2.3488,
                 "country": "France", "admin1": "Île-de-France"},
                {"id": 4717560, "name": "Paris", "latitude": 33.66094, "longitude": -95.55551,
                 "country": "United States", "admin1": "Texas"},
                {"id": 1, "name": "Paris", "latitude": 1.0, "longitude": 2.0}
            ],
            "generationtime_ms": 0.5
        }"#;
        let response: GeocodingResponse = serde_json::from_str(json).expect("Failed to parse");
        let suggestions = response.into_suggestions();

        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].name, "Paris, Île-de-France, France");
        assert_eq!(suggestions[1].name, "Paris, Texas, United States");
        assert_eq!(suggestions[2].name, "Paris");
        assert!((suggestions[1].longitude - (-95.55551)).abs() < 1e-6);
    }

    #[test]
    fn test_missing_results_is_empty() {
        let response: GeocodingResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.2}"#).expect("Failed to parse");
        assert!(response.into_suggestions().is_empty());
    }

    #[test]
    fn test_results_capped() {
        let results: Vec<String> = (0..10)
            .map(|i| format!(r#"{{"name": "Town {}", "latitude": 0.0, "longitude": 0.0}}"#, i))
            .collect();
        let json = format!(r#"{{"results": [{}]}}"#, results.join(","));
        let response: GeocodingResponse = serde_json::from_str(&json).expect("Failed to parse");
        assert_eq!(response.into_suggestions().len(), MAX_SUGGESTIONS);
    }

    #[tokio::test]
    async fn test_search_sends_expected_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("name", "Tokyo"))
            .and(query_param("count", "6"))
            .and(query_param("language", "en"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"name": "Tokyo", "latitude": 35.6895, "longitude": 139.69171,
                     "country": "Japan", "admin1": "Tokyo"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = GeocodeClient::new().with_base_url(mock_server.uri());
        let suggestions = client.search("Tokyo").await.unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Tokyo, Tokyo, Japan");
    }

    #[tokio::test]
    async fn test_server_error_collapses_to_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = GeocodeClient::new().with_base_url(mock_server.uri());
        assert!(matches!(client.search("Oslo").await, Err(GeocodeError::Status(500))));
        assert!(client.suggest("Oslo").await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_collapses_to_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ invalid json }"))
            .mount(&mock_server)
            .await;

        let client = GeocodeClient::new().with_base_url(mock_server.uri());
        assert!(matches!(client.search("Oslo").await, Err(GeocodeError::ParseError(_))));
        assert!(client.suggest("Oslo").await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_skips_request() {
        // No server: a request would fail, an empty query must not make one
        let client = GeocodeClient::new().with_base_url("http://127.0.0.1:9");
        assert!(client.search("   ").await.unwrap().is_empty());
    }
}
