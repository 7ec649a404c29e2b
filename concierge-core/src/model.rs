use serde::{Deserialize, Serialize};

/// First (and only) candidate returned by the geocoding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub resolved_name: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeocodeResult {
    /// Locality header for the briefing: "Name, Country", "Name", or the
    /// raw query text when the service returned no usable name.
    pub fn locality(&self, fallback_query: &str) -> String {
        match (&self.resolved_name, &self.country) {
            (Some(name), Some(country)) => format!("{name}, {country}"),
            (Some(name), None) => name.clone(),
            _ => fallback_query.to_string(),
        }
    }
}

/// Current conditions plus short-range hourly precipitation probability.
///
/// `observed_at` is the service's own local-time ISO string, passed through
/// untouched. Only the temperature is load-bearing; the other current fields
/// degrade gracefully when the upstream omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub wind_speed_kph: Option<f64>,
    pub weather_code: Option<i64>,
    pub observed_at: Option<String>,
    pub hourly_precip_probability: Vec<f64>,
}
