//! Location-to-briefing weather lookup.
//!
//! A linear three-step pipeline: validate the query, geocode it, fetch the
//! forecast, then render a short dining-oriented briefing. Each invocation
//! performs at most two sequential HTTP requests, each with its own timeout.
//! There is no retry and no state shared across invocations.

use crate::config::WeatherConfig;

pub mod briefing;
pub mod open_meteo;

use open_meteo::OpenMeteoClient;

/// Everything that can go wrong during a lookup. Each variant renders to the
/// plain-text message handed back through the tool surface; none of these is
/// fatal to the hosting process.
#[derive(Debug, thiserror::Error)]
pub enum WeatherLookupError {
    #[error("No location provided for the weather lookup.")]
    InvalidInput,

    #[error("No coordinates found for '{query}'. Try a larger city or include the state/country.")]
    NoMatch { query: String },

    #[error("Could not determine coordinates for '{query}'.")]
    MissingCoordinates { query: String },

    /// Transient: the service answered but without a usable temperature.
    #[error("Weather data is temporarily unavailable. Please try again later.")]
    DataUnavailable,

    #[error("Weather service error: {source}. Please try again with a different location or later.")]
    Service {
        #[from]
        source: reqwest::Error,
    },
}

/// The weather-lookup unit: free-text location in, briefing text out.
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    client: OpenMeteoClient,
}

impl WeatherLookup {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherLookupError> {
        Ok(Self {
            client: OpenMeteoClient::new(config)?,
        })
    }

    /// Resolve, fetch and format. Blank input is rejected before any
    /// network call is made.
    pub async fn briefing(&self, location: &str) -> Result<String, WeatherLookupError> {
        let query = location.trim();
        if query.is_empty() {
            return Err(WeatherLookupError::InvalidInput);
        }

        let geo = self.client.geocode(query).await?;
        tracing::debug!(
            query,
            latitude = geo.latitude,
            longitude = geo.longitude,
            "resolved location"
        );

        let snapshot = self.client.forecast(geo.latitude, geo.longitude).await?;
        Ok(briefing::compose(query, &geo, &snapshot))
    }

    /// Text-only surface consumed by the crew: one string argument, one
    /// string result. Failures are rendered to their user-facing message
    /// instead of crossing this boundary as structured errors.
    pub async fn report(&self, location: &str) -> String {
        match self.briefing(location).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "weather lookup failed");
                err.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup_against(server_uri: &str) -> WeatherLookup {
        let config = WeatherConfig {
            geocode_url: format!("{server_uri}/v1/search"),
            forecast_url: format!("{server_uri}/v1/forecast"),
            timeout_secs: 2,
        };
        WeatherLookup::new(&config).expect("client must build")
    }

    #[tokio::test]
    async fn blank_input_short_circuits_without_any_request() {
        let server = MockServer::start().await;
        let lookup = lookup_against(&server.uri());

        for input in ["", "   ", "\t\n"] {
            let err = lookup.briefing(input).await.unwrap_err();
            assert!(matches!(err, WeatherLookupError::InvalidInput));
        }

        // No mocks registered: any request would have 404'd into a Service
        // error, and the mock server records received requests.
        assert!(server.received_requests().await.unwrap().is_empty());
        assert_eq!(
            lookup.report("  ").await,
            "No location provided for the weather lookup."
        );
    }

    #[tokio::test]
    async fn end_to_end_briefing_over_both_endpoints() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Chicago"))
            .and(query_param("count", "1"))
            .and(query_param("language", "en"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "name": "Chicago",
                    "country": "United States",
                    "latitude": 41.85,
                    "longitude": -87.65
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("current_weather", "true"))
            .and(query_param("hourly", "precipitation_probability,weathercode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current_weather": {
                    "temperature": 18.0,
                    "windspeed": 12.0,
                    "weathercode": 2,
                    "time": "2024-05-01T14:00"
                },
                "hourly": {
                    "precipitation_probability": [10, 20, 30, 40, 50, 60, 70]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = lookup_against(&server.uri());
        let text = lookup.report("  Chicago  ").await;

        assert!(text.starts_with("Weather for Chicago, United States at 2024-05-01T14:00:"));
        assert!(text.contains("- Temperature: 18°C"));
        assert!(text.contains("- Windspeed: 12 km/h"));
        assert!(text.contains("- Conditions: partly cloudy"));
        assert!(text.contains("next few hours: 35%"));
        assert!(text.ends_with(briefing::DINING_CAVEAT));
    }

    #[tokio::test]
    async fn geocode_failure_stops_before_the_forecast_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server)
            .await;

        let lookup = lookup_against(&server.uri());
        let report = lookup.report("Atlantis").await;

        assert_eq!(
            report,
            "No coordinates found for 'Atlantis'. Try a larger city or include the state/country."
        );
        // Only the geocoding endpoint was hit.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/v1/search");
    }
}
