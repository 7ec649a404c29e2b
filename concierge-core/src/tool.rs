//! Text-in/text-out tools exposed to the crew's agents.
//!
//! Every tool takes one string argument and returns one string; failures are
//! rendered to user-readable text before they cross this boundary. Agents
//! declare which tools they may use through [`ToolId`], an explicit
//! capability tag; there is no runtime discovery.

use async_trait::async_trait;
use chrono::{Local, NaiveTime};
use std::convert::TryFrom;
use std::fmt::Debug;
use std::sync::Arc;

use crate::guide::{PeakSchedule, Venue, VenueGuide};
use crate::weather::WeatherLookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    WeatherLookup,
    VenueSearch,
    DietaryFilter,
    Ambiance,
    PeakTimes,
}

impl ToolId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::WeatherLookup => "weather-lookup",
            ToolId::VenueSearch => "venue-search",
            ToolId::DietaryFilter => "dietary-filter",
            ToolId::Ambiance => "ambiance",
            ToolId::PeakTimes => "peak-times",
        }
    }

    pub const fn all() -> &'static [ToolId] {
        &[
            ToolId::WeatherLookup,
            ToolId::VenueSearch,
            ToolId::DietaryFilter,
            ToolId::Ambiance,
            ToolId::PeakTimes,
        ]
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ToolId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weather-lookup" => Ok(ToolId::WeatherLookup),
            "venue-search" => Ok(ToolId::VenueSearch),
            "dietary-filter" => Ok(ToolId::DietaryFilter),
            "ambiance" => Ok(ToolId::Ambiance),
            "peak-times" => Ok(ToolId::PeakTimes),
            _ => Err(anyhow::anyhow!(
                "Unknown tool '{value}'. Supported tools: weather-lookup, venue-search, \
                 dietary-filter, ambiance, peak-times."
            )),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync + Debug {
    fn id(&self) -> ToolId;
    fn description(&self) -> &'static str;
    async fn call(&self, input: &str) -> String;
}

/// The set of tools available to a crew run.
#[derive(Debug)]
pub struct Toolbox {
    tools: Vec<Box<dyn Tool>>,
}

impl Toolbox {
    /// All five standard tools over a shared guide and weather lookup.
    pub fn standard(guide: Arc<VenueGuide>, lookup: WeatherLookup) -> Self {
        Self {
            tools: vec![
                Box::new(WeatherLookupTool { lookup }),
                Box::new(VenueSearchTool {
                    guide: Arc::clone(&guide),
                }),
                Box::new(DietaryFilterTool {
                    guide: Arc::clone(&guide),
                }),
                Box::new(AmbianceTool {
                    guide: Arc::clone(&guide),
                }),
                Box::new(PeakTimeTool { guide }),
            ],
        }
    }

    pub fn get(&self, id: ToolId) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.id() == id)
            .map(|tool| &**tool)
    }
}

/// Live weather briefing for a dining location.
#[derive(Debug)]
pub struct WeatherLookupTool {
    lookup: WeatherLookup,
}

#[async_trait]
impl Tool for WeatherLookupTool {
    fn id(&self) -> ToolId {
        ToolId::WeatherLookup
    }

    fn description(&self) -> &'static str {
        "Look up the current weather for the provided dining location and return a concise summary."
    }

    async fn call(&self, input: &str) -> String {
        self.lookup.report(input).await
    }
}

/// Listing of the guide's venues for whichever city the query names.
#[derive(Debug)]
pub struct VenueSearchTool {
    guide: Arc<VenueGuide>,
}

#[async_trait]
impl Tool for VenueSearchTool {
    fn id(&self) -> ToolId {
        ToolId::VenueSearch
    }

    fn description(&self) -> &'static str {
        "Search for restaurants with detailed information including address, weather \
         suitability, peak hours, dietary options, and ambiance"
    }

    async fn call(&self, input: &str) -> String {
        let city = self.guide.match_city(input);
        let venues = self.guide.venues_in(city);

        let mut output = format!("Found {} restaurants in {}:\n", venues.len(), city);
        for (index, venue) in venues.iter().enumerate() {
            output.push('\n');
            output.push_str(&format_venue(index + 1, venue));
        }
        output
    }
}

fn format_venue(position: usize, venue: &Venue) -> String {
    format!(
        "{position}. {}\n   Cuisine: {}\n   Rating: {:.1}/5.0\n   Price: {}\n   Address: {}\n   \
         Weather Suitable: {}\n   Peak Hours: {}\n   Dietary Options: {}\n   Ambiance: {}\n   \
         Special Features: {}\n",
        venue.name,
        venue.cuisine,
        venue.rating,
        venue.price_range,
        venue.address,
        venue.weather_suitable.join(", "),
        venue.peak.hours_text(),
        venue.dietary_options.join(", "),
        venue.ambiance,
        venue.special_features.join(", "),
    )
}

/// Venues matching a dietary preference.
#[derive(Debug)]
pub struct DietaryFilterTool {
    guide: Arc<VenueGuide>,
}

#[async_trait]
impl Tool for DietaryFilterTool {
    fn id(&self) -> ToolId {
        ToolId::DietaryFilter
    }

    fn description(&self) -> &'static str {
        "Filter restaurants based on dietary preferences (vegan, vegetarian, gluten-free, etc.)"
    }

    async fn call(&self, input: &str) -> String {
        let preference = input.trim();
        let matches = self.guide.for_diet(preference);

        if matches.is_empty() {
            return format!("No restaurants found with {preference} options in our database.");
        }

        let mut output = format!("Restaurants suitable for {preference} diet:\n");
        for venue in matches {
            output.push_str(&format!("• {}\n", venue.name));
        }
        output
    }
}

/// Venues matching a desired ambiance.
#[derive(Debug)]
pub struct AmbianceTool {
    guide: Arc<VenueGuide>,
}

#[async_trait]
impl Tool for AmbianceTool {
    fn id(&self) -> ToolId {
        ToolId::Ambiance
    }

    fn description(&self) -> &'static str {
        "Find restaurants with specific ambiance (romantic, casual, fine dining, etc.)"
    }

    async fn call(&self, input: &str) -> String {
        let kind = input.trim();
        let matches = self.guide.with_ambiance(kind);

        if matches.is_empty() {
            return format!("No restaurants found with {kind} ambiance in our database.");
        }

        let mut output = format!("Restaurants with {kind} ambiance:\n");
        for venue in matches {
            output.push_str(&format!("• {}\n", venue.name));
        }
        output
    }
}

/// Peak dining hours and wait times. Accepts a venue name; any other text is
/// matched to a city and expanded to every venue there.
#[derive(Debug)]
pub struct PeakTimeTool {
    guide: Arc<VenueGuide>,
}

#[async_trait]
impl Tool for PeakTimeTool {
    fn id(&self) -> ToolId {
        ToolId::PeakTimes
    }

    fn description(&self) -> &'static str {
        "Get peak dining hours and wait times for a specific restaurant"
    }

    async fn call(&self, input: &str) -> String {
        let now = Local::now().time();
        let query = input.trim();

        if let Some(venue) = self.guide.find_venue(query) {
            return format_schedule(&venue.name, &venue.peak, now);
        }

        let city = self.guide.match_city(query);
        let venues = self.guide.venues_in(city);
        if venues.is_empty() {
            return format_schedule(query, &PeakSchedule::fallback(), now);
        }

        venues
            .iter()
            .map(|venue| format_schedule(&venue.name, &venue.peak, now))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn format_schedule(name: &str, schedule: &PeakSchedule, now: NaiveTime) -> String {
    let status = if schedule.is_peak(now) {
        "within peak hours"
    } else {
        "off-peak"
    };

    format!(
        "Peak Time Information for {name}:\nPeak Hours: {}\nBest Time to Visit: {}\n\
         Wait Time (Peak): {}\nWait Time (Off-Peak): {}\nStatus at {}: {status}\n",
        schedule.hours_text(),
        schedule.best_time,
        schedule.wait_peak,
        schedule.wait_off_peak,
        now.format("%H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;

    fn toolbox() -> Toolbox {
        let lookup = WeatherLookup::new(&WeatherConfig::default()).unwrap();
        Toolbox::standard(Arc::new(VenueGuide::builtin()), lookup)
    }

    #[test]
    fn tool_id_as_str_roundtrip() {
        for id in ToolId::all() {
            let s = id.as_str();
            let parsed = ToolId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_tool_error() {
        let err = ToolId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[test]
    fn standard_toolbox_carries_all_tools() {
        let toolbox = toolbox();
        for id in ToolId::all() {
            let tool = toolbox.get(*id).expect("tool should be present");
            assert_eq!(tool.id(), *id);
            assert!(!tool.description().is_empty());
        }
    }

    #[tokio::test]
    async fn venue_search_lists_the_matched_city() {
        let toolbox = toolbox();
        let search = toolbox.get(ToolId::VenueSearch).unwrap();

        let output = search.call("ramen night in Tokyo").await;
        assert!(output.starts_with("Found 2 restaurants in Tokyo:"));
        assert!(output.contains("1. Sukiyabashi Jiro"));
        assert!(output.contains("2. Ichiran Ramen"));
        assert!(output.contains("Rating: 4.4/5.0"));
        assert!(output.contains("Peak Hours: 11:30-14:00, 17:00-22:00"));
    }

    #[tokio::test]
    async fn venue_search_falls_back_to_default_city() {
        let toolbox = toolbox();
        let search = toolbox.get(ToolId::VenueSearch).unwrap();

        let output = search.call("somewhere good").await;
        assert!(output.starts_with("Found 3 restaurants in San Francisco:"));
    }

    #[tokio::test]
    async fn dietary_filter_lists_matches_or_apologizes() {
        let toolbox = toolbox();
        let dietary = toolbox.get(ToolId::DietaryFilter).unwrap();

        let output = dietary.call("vegan").await;
        assert!(output.starts_with("Restaurants suitable for vegan diet:"));
        assert!(output.contains("• Greens Restaurant"));

        let empty = dietary.call("kosher").await;
        assert_eq!(
            empty,
            "No restaurants found with kosher options in our database."
        );
    }

    #[tokio::test]
    async fn ambiance_tool_lists_matches_or_apologizes() {
        let toolbox = toolbox();
        let ambiance = toolbox.get(ToolId::Ambiance).unwrap();

        let output = ambiance.call("romantic").await;
        assert!(output.contains("• Greens Restaurant"));

        let empty = ambiance.call("dive bar").await;
        assert_eq!(
            empty,
            "No restaurants found with dive bar ambiance in our database."
        );
    }

    #[tokio::test]
    async fn peak_times_for_a_single_venue() {
        let toolbox = toolbox();
        let peaks = toolbox.get(ToolId::PeakTimes).unwrap();

        let output = peaks.call("Gary Danko").await;
        assert!(output.starts_with("Peak Time Information for Gary Danko:"));
        assert!(output.contains("Wait Time (Peak): N/A - Reservation only"));
        assert!(output.contains("Status at "));
    }

    #[tokio::test]
    async fn peak_times_expand_a_city_to_all_its_venues() {
        let toolbox = toolbox();
        let peaks = toolbox.get(ToolId::PeakTimes).unwrap();

        let output = peaks.call("Berlin").await;
        assert!(output.contains("Peak Time Information for Nobelhart & Schmutzig:"));
        assert!(output.contains("Peak Time Information for Mustafa's Gemüse Kebap:"));
        assert!(output.contains("Peak Time Information for Zur Letzten Instanz:"));
    }

    #[test]
    fn schedule_formatting_reports_peak_status() {
        let schedule = PeakSchedule::fallback();
        let lunch = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
        let afternoon = NaiveTime::from_hms_opt(15, 30, 0).unwrap();

        let at_lunch = format_schedule("Test Venue", &schedule, lunch);
        assert!(at_lunch.contains("Status at 12:30: within peak hours"));

        let mid_afternoon = format_schedule("Test Venue", &schedule, afternoon);
        assert!(mid_afternoon.contains("Status at 15:30: off-peak"));
    }

    #[tokio::test]
    async fn weather_tool_renders_invalid_input_as_text() {
        let toolbox = toolbox();
        let weather = toolbox.get(ToolId::WeatherLookup).unwrap();

        let output = weather.call("   ").await;
        assert_eq!(output, "No location provided for the weather lookup.");
    }
}
