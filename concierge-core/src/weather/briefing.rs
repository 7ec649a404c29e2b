//! Pure rendering of a weather briefing. No I/O lives here.

use crate::model::{GeocodeResult, WeatherSnapshot};

/// Closing line of every briefing, for the downstream recommendation stage.
pub const DINING_CAVEAT: &str = "Consider whether outdoor seating is comfortable \
and mention any contingency plans in your recommendation.";

/// How many leading hourly entries feed the precipitation average (~6 hours).
const PRECIP_WINDOW: usize = 6;

/// Human-readable label for a WMO weather code.
///
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn condition_label(code: Option<i64>) -> &'static str {
    match code {
        Some(0) => "clear sky",
        Some(1) => "mainly clear",
        Some(2) => "partly cloudy",
        Some(3) => "overcast",
        Some(45) => "foggy",
        Some(48) => "depositing rime fog",
        Some(51) => "light drizzle",
        Some(53) => "moderate drizzle",
        Some(55) => "dense drizzle",
        Some(56) => "freezing drizzle",
        Some(57) => "dense freezing drizzle",
        Some(61) => "slight rain",
        Some(63) => "moderate rain",
        Some(65) => "heavy rain",
        Some(66) => "light freezing rain",
        Some(67) => "heavy freezing rain",
        Some(71) => "slight snow fall",
        Some(73) => "moderate snow fall",
        Some(75) => "heavy snow fall",
        Some(77) => "snow grains",
        Some(80) => "slight rain showers",
        Some(81) => "moderate rain showers",
        Some(82) => "violent rain showers",
        Some(85) => "slight snow showers",
        Some(86) => "heavy snow showers",
        Some(95) => "thunderstorm",
        Some(96) => "thunderstorm with slight hail",
        Some(99) => "thunderstorm with heavy hail",
        _ => "current conditions",
    }
}

/// Compose the multi-line briefing in fixed order: header, temperature,
/// windspeed, conditions, optional precipitation average, closing caveat.
pub fn compose(query: &str, geo: &GeocodeResult, snapshot: &WeatherSnapshot) -> String {
    let locality = geo.locality(query);
    let observed = snapshot.observed_at.as_deref().unwrap_or("now");

    let mut lines = vec![
        format!("Weather for {locality} at {observed}:"),
        format!("- Temperature: {}°C", fmt_metric(snapshot.temperature_c)),
        format!("- Windspeed: {} km/h", wind_text(snapshot.wind_speed_kph)),
        format!("- Conditions: {}", condition_label(snapshot.weather_code)),
    ];

    // An empty series means the line is omitted, never shown as 0%.
    if let Some(avg) = precip_average(&snapshot.hourly_precip_probability) {
        lines.push(format!(
            "- Average precipitation chance next few hours: {avg}%"
        ));
    }

    lines.push(DINING_CAVEAT.to_string());
    lines.join("\n")
}

/// Mean of the first [`PRECIP_WINDOW`] entries, rounded to the nearest
/// integer percent. `None` when the series is empty.
fn precip_average(probabilities: &[f64]) -> Option<i64> {
    if probabilities.is_empty() {
        return None;
    }
    let window = &probabilities[..probabilities.len().min(PRECIP_WINDOW)];
    let avg = window.iter().sum::<f64>() / window.len() as f64;
    Some(avg.round() as i64)
}

fn wind_text(wind: Option<f64>) -> String {
    wind.map_or_else(|| "unknown".to_string(), fmt_metric)
}

/// Print whole-number metrics without a trailing ".0".
fn fmt_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicago_geo() -> GeocodeResult {
        GeocodeResult {
            resolved_name: Some("Chicago".to_string()),
            country: Some("United States".to_string()),
            latitude: 41.85,
            longitude: -87.65,
        }
    }

    fn chicago_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c: 18.0,
            wind_speed_kph: Some(12.0),
            weather_code: Some(2),
            observed_at: Some("2024-05-01T14:00".to_string()),
            hourly_precip_probability: vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0],
        }
    }

    #[test]
    fn briefing_renders_fixed_line_order() {
        let text = compose("chicago", &chicago_geo(), &chicago_snapshot());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Weather for Chicago, United States at 2024-05-01T14:00:");
        assert_eq!(lines[1], "- Temperature: 18°C");
        assert_eq!(lines[2], "- Windspeed: 12 km/h");
        assert_eq!(lines[3], "- Conditions: partly cloudy");
        // First six entries only: (10+20+30+40+50+60)/6 = 35.
        assert_eq!(lines[4], "- Average precipitation chance next few hours: 35%");
        assert_eq!(lines[5], DINING_CAVEAT);
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn empty_precip_series_omits_the_line() {
        let mut snapshot = chicago_snapshot();
        snapshot.hourly_precip_probability.clear();

        let text = compose("chicago", &chicago_geo(), &snapshot);
        assert!(!text.contains("precipitation"));
        assert!(text.ends_with(DINING_CAVEAT));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn short_precip_series_averages_what_is_there() {
        let mut snapshot = chicago_snapshot();
        snapshot.hourly_precip_probability = vec![10.0, 21.0];

        let text = compose("chicago", &chicago_geo(), &snapshot);
        assert!(text.contains("next few hours: 16%"));
    }

    #[test]
    fn unknown_weather_code_uses_fallback_label() {
        let mut snapshot = chicago_snapshot();
        snapshot.weather_code = Some(120);

        let text = compose("chicago", &chicago_geo(), &snapshot);
        assert!(text.contains("- Conditions: current conditions"));
    }

    #[test]
    fn missing_resolved_name_falls_back_to_query_text() {
        let geo = GeocodeResult {
            resolved_name: None,
            country: None,
            latitude: 0.0,
            longitude: 0.0,
        };
        let text = compose("springfield", &geo, &chicago_snapshot());
        assert!(text.starts_with("Weather for springfield at"));
    }

    #[test]
    fn known_code_table_spot_checks() {
        assert_eq!(condition_label(Some(0)), "clear sky");
        assert_eq!(condition_label(Some(55)), "dense drizzle");
        assert_eq!(condition_label(Some(95)), "thunderstorm");
        assert_eq!(condition_label(Some(99)), "thunderstorm with heavy hail");
        assert_eq!(condition_label(None), "current conditions");
    }

    #[test]
    fn fractional_metrics_keep_one_decimal() {
        let mut snapshot = chicago_snapshot();
        snapshot.temperature_c = 17.3;
        snapshot.wind_speed_kph = Some(9.6);

        let text = compose("chicago", &chicago_geo(), &snapshot);
        assert!(text.contains("- Temperature: 17.3°C"));
        assert!(text.contains("- Windspeed: 9.6 km/h"));
    }
}
