//! HTTP clients for the Open-Meteo geocoding and forecast services.
//!
//! Both endpoints are keyless. Endpoint URLs come from [`WeatherConfig`] so
//! tests and self-hosted mirrors can point the clients elsewhere.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::model::{GeocodeResult, WeatherSnapshot};

use super::WeatherLookupError;

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocode_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherLookupError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            geocode_url: config.geocode_url.clone(),
            forecast_url: config.forecast_url.clone(),
        })
    }

    /// Resolve a place name to coordinates, taking the first candidate in
    /// the service's own ordering. No ranking or disambiguation here.
    pub async fn geocode(&self, query: &str) -> Result<GeocodeResult, WeatherLookupError> {
        let response = self
            .http
            .get(&self.geocode_url)
            .query(&[
                ("name", query),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let parsed: GeocodeResponse = response.json().await?;

        let Some(candidate) = parsed.results.unwrap_or_default().into_iter().next() else {
            return Err(WeatherLookupError::NoMatch {
                query: query.to_string(),
            });
        };

        let (Some(latitude), Some(longitude)) = (candidate.latitude, candidate.longitude) else {
            return Err(WeatherLookupError::MissingCoordinates {
                query: query.to_string(),
            });
        };

        Ok(GeocodeResult {
            resolved_name: candidate.name,
            country: candidate.country,
            latitude,
            longitude,
        })
    }

    /// Fetch current conditions plus the hourly precipitation-probability
    /// series for the given coordinates.
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, WeatherLookupError> {
        let response = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", "precipitation_probability,weathercode".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let parsed: ForecastResponse = response.json().await?;

        let current = parsed.current_weather.unwrap_or_default();
        let Some(temperature_c) = current.temperature else {
            // The service answered but without the one field the briefing
            // cannot do without. Transient, not a hard failure.
            return Err(WeatherLookupError::DataUnavailable);
        };

        let hourly_precip_probability = parsed
            .hourly
            .and_then(|hourly| hourly.precipitation_probability)
            .unwrap_or_default();

        Ok(WeatherSnapshot {
            temperature_c,
            wind_speed_kph: current.windspeed,
            weather_code: current.weathercode,
            observed_at: current.time,
            hourly_precip_probability,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeCandidate {
    name: Option<String>,
    country: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
    hourly: Option<Hourly>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i64>,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    precipitation_probability: Option<Vec<f64>>,
}
