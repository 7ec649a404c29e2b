//! The venue guide: an immutable, in-memory directory of restaurants with
//! dining-relevant attributes (dietary options, ambiance, peak hours,
//! weather suitability).
//!
//! The guide is constructed once at startup (either the built-in dataset or
//! a TOML file) and passed explicitly to the tools that need it. It is never
//! mutated afterwards.

use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// A single "HH:MM-HH:MM" busy window. Windows that end before they start
/// are treated as wrapping past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl PeakWindow {
    pub fn parse(text: &str) -> Result<Self> {
        let (start, end) = text
            .split_once('-')
            .with_context(|| format!("Peak window '{text}' is not of the form HH:MM-HH:MM"))?;

        let parse_time = |part: &str| {
            NaiveTime::parse_from_str(part.trim(), "%H:%M")
                .with_context(|| format!("Invalid time '{part}' in peak window '{text}'"))
        };

        Ok(Self {
            start: parse_time(start)?,
            end: parse_time(end)?,
        })
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }
}

impl fmt::Display for PeakWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Busy windows plus the advisory text served by the peak-time tool.
#[derive(Debug, Clone)]
pub struct PeakSchedule {
    pub windows: Vec<PeakWindow>,
    pub best_time: String,
    pub wait_peak: String,
    pub wait_off_peak: String,
}

impl PeakSchedule {
    fn parse(windows: &str, best_time: &str, wait_peak: &str, wait_off_peak: &str) -> Result<Self> {
        let windows = windows
            .split(',')
            .map(|part| PeakWindow::parse(part.trim()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            windows,
            best_time: best_time.to_string(),
            wait_peak: wait_peak.to_string(),
            wait_off_peak: wait_off_peak.to_string(),
        })
    }

    /// Served for venues the guide has no record of.
    pub fn fallback() -> Self {
        Self::parse(
            "12:00-14:00, 18:00-20:00",
            "Off-peak hours recommended",
            "20-30 minutes",
            "5-10 minutes",
        )
        .expect("fallback schedule is well-formed")
    }

    pub fn is_peak(&self, time: NaiveTime) -> bool {
        self.windows.iter().any(|window| window.contains(time))
    }

    pub fn hours_text(&self) -> String {
        self.windows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone)]
pub struct Venue {
    pub name: String,
    pub cuisine: String,
    pub rating: f32,
    pub price_range: String,
    pub address: String,
    pub weather_suitable: Vec<String>,
    pub dietary_options: Vec<String>,
    pub ambiance: String,
    pub special_features: Vec<String>,
    pub peak: PeakSchedule,
}

#[derive(Debug, Clone)]
pub struct CityVenues {
    pub city: String,
    pub venues: Vec<Venue>,
}

/// The guide itself. City order matters only for keyword matching ties; the
/// configured default city answers queries that name no known city.
#[derive(Debug, Clone)]
pub struct VenueGuide {
    cities: Vec<CityVenues>,
    default_city: String,
}

impl VenueGuide {
    /// Load a guide from a TOML file. See `GuideFile` for the layout.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read venue guide: {}", path.display()))?;
        let file: GuideFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse venue guide: {}", path.display()))?;
        Self::from_file(file)
    }

    fn from_file(file: GuideFile) -> Result<Self> {
        if file.city.is_empty() {
            bail!("Venue guide must declare at least one city");
        }

        let cities = file
            .city
            .into_iter()
            .map(|city| {
                let venues = city
                    .venue
                    .into_iter()
                    .map(VenueEntry::into_venue)
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("In city '{}'", city.name))?;
                Ok(CityVenues {
                    city: city.name,
                    venues,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let default_city = file
            .default_city
            .unwrap_or_else(|| cities[0].city.clone());
        if !cities.iter().any(|c| c.city == default_city) {
            bail!("Default city '{default_city}' has no venue entries");
        }

        Ok(Self {
            cities,
            default_city,
        })
    }

    /// Scan free text for a known city name; unmatched queries fall back to
    /// the default city.
    pub fn match_city<'a>(&'a self, query: &str) -> &'a str {
        let lowered = query.to_lowercase();
        self.cities
            .iter()
            .map(|c| c.city.as_str())
            .find(|city| lowered.contains(&city.to_lowercase()))
            .unwrap_or(&self.default_city)
    }

    pub fn venues_in(&self, city: &str) -> &[Venue] {
        match self.cities.iter().find(|c| c.city.eq_ignore_ascii_case(city)) {
            Some(c) => c.venues.as_slice(),
            None => &[],
        }
    }

    pub fn find_venue(&self, name: &str) -> Option<&Venue> {
        self.all_venues()
            .find(|venue| venue.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Venues whose dietary options mention the preference.
    pub fn for_diet(&self, preference: &str) -> Vec<&Venue> {
        let wanted = preference.trim().to_lowercase();
        self.all_venues()
            .filter(|venue| {
                venue
                    .dietary_options
                    .iter()
                    .any(|option| option.to_lowercase().contains(&wanted))
            })
            .collect()
    }

    /// Venues whose ambiance description mentions the requested kind.
    pub fn with_ambiance(&self, kind: &str) -> Vec<&Venue> {
        let wanted = kind.trim().to_lowercase();
        self.all_venues()
            .filter(|venue| venue.ambiance.to_lowercase().contains(&wanted))
            .collect()
    }

    /// Peak schedule for a venue, or the generic fallback when unknown.
    pub fn peak_schedule(&self, venue_name: &str) -> PeakSchedule {
        self.find_venue(venue_name)
            .map_or_else(PeakSchedule::fallback, |venue| venue.peak.clone())
    }

    fn all_venues(&self) -> impl Iterator<Item = &Venue> {
        self.cities.iter().flat_map(|c| c.venues.iter())
    }

    /// The simulated directory the demo ships with: a handful of venues in
    /// San Francisco, Berlin and Tokyo.
    pub fn builtin() -> Self {
        let sf = CityVenues {
            city: "San Francisco".to_string(),
            venues: vec![
                builtin_venue(
                    "Greens Restaurant",
                    "Vegetarian/Vegan",
                    4.8,
                    "$$$",
                    "Building A, Fort Mason, San Francisco, CA 94123",
                    &["sunny", "clear", "partly_cloudy"],
                    &["vegan", "vegetarian", "gluten-free"],
                    "upscale, romantic, with bay view",
                    &["outdoor seating", "bay view", "wine selection"],
                    ("12:00-13:30, 18:00-20:00", "14:00-17:00 or after 20:30", "30-45 minutes", "5-10 minutes"),
                ),
                builtin_venue(
                    "State Bird Provisions",
                    "American/Asian Fusion",
                    4.7,
                    "$$",
                    "1529 Fillmore St, San Francisco, CA 94115",
                    &["any"],
                    &["vegetarian", "pescatarian"],
                    "casual, trendy, intimate",
                    &["dim sum style", "creative plating", "intimate setting"],
                    ("11:30-13:00, 17:30-19:30", "13:30-17:00 or after 20:00", "45-60 minutes", "10-15 minutes"),
                ),
                builtin_venue(
                    "Gary Danko",
                    "French/Contemporary",
                    4.9,
                    "$$$$",
                    "800 North Point St, San Francisco, CA 94109",
                    &["any"],
                    &["vegetarian", "gluten-free"],
                    "fine dining, elegant, upscale",
                    &["michelin star", "tasting menu", "sommelier service"],
                    ("17:30-19:00, 20:00-21:30", "Reservation required (no walk-ins)", "N/A - Reservation only", "N/A - Reservation only"),
                ),
            ],
        };

        let berlin = CityVenues {
            city: "Berlin".to_string(),
            venues: vec![
                builtin_venue(
                    "Nobelhart & Schmutzig",
                    "German/Contemporary",
                    4.8,
                    "$$$",
                    "Friedrichstr. 218, 10969 Berlin, Germany",
                    &["any"],
                    &["vegetarian"],
                    "fine dining, modern, minimalist",
                    &["michelin star", "local ingredients", "tasting menu"],
                    ("18:00-19:30, 20:30-22:00", "Off-peak hours recommended", "20-30 minutes", "5-10 minutes"),
                ),
                builtin_venue(
                    "Mustafa's Gemüse Kebap",
                    "Turkish/Street Food",
                    4.6,
                    "$",
                    "Mehringdamm 32, 10961 Berlin, Germany",
                    &["sunny", "clear"],
                    &["vegetarian", "vegan"],
                    "casual, street food, lively",
                    &["famous kebab", "quick service", "budget-friendly"],
                    ("12:00-14:00, 18:00-22:00", "Off-peak hours recommended", "20-30 minutes", "5-10 minutes"),
                ),
                builtin_venue(
                    "Zur Letzten Instanz",
                    "German/Traditional",
                    4.5,
                    "$$",
                    "Waisenstr. 14-16, 10179 Berlin, Germany",
                    &["any"],
                    &["vegetarian"],
                    "traditional, cozy, historic",
                    &["oldest restaurant in Berlin", "traditional decor", "beer selection"],
                    ("12:00-14:00, 18:00-21:00", "Off-peak hours recommended", "20-30 minutes", "5-10 minutes"),
                ),
            ],
        };

        let tokyo = CityVenues {
            city: "Tokyo".to_string(),
            venues: vec![
                builtin_venue(
                    "Sukiyabashi Jiro",
                    "Sushi/Japanese",
                    4.9,
                    "$$$$",
                    "4 Chome-2-15 Ginza, Chuo City, Tokyo 104-0061, Japan",
                    &["any"],
                    &["pescatarian"],
                    "fine dining, minimalist, intimate",
                    &["3 michelin stars", "omakase only", "counter seating"],
                    ("11:30-14:00, 16:30-20:30", "Reservation required", "N/A - Reservation only", "N/A - Reservation only"),
                ),
                builtin_venue(
                    "Ichiran Ramen",
                    "Ramen/Japanese",
                    4.4,
                    "$",
                    "Multiple locations in Tokyo",
                    &["any"],
                    &["vegetarian option available"],
                    "casual, lively, counter seating",
                    &["famous ramen chain", "quick service", "individual booths"],
                    ("11:30-14:00, 17:00-22:00", "Off-peak hours recommended", "20-30 minutes", "5-10 minutes"),
                ),
            ],
        };

        Self {
            cities: vec![sf, berlin, tokyo],
            default_city: "San Francisco".to_string(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn builtin_venue(
    name: &str,
    cuisine: &str,
    rating: f32,
    price_range: &str,
    address: &str,
    weather_suitable: &[&str],
    dietary_options: &[&str],
    ambiance: &str,
    special_features: &[&str],
    (windows, best_time, wait_peak, wait_off_peak): (&str, &str, &str, &str),
) -> Venue {
    Venue {
        name: name.to_string(),
        cuisine: cuisine.to_string(),
        rating,
        price_range: price_range.to_string(),
        address: address.to_string(),
        weather_suitable: weather_suitable.iter().map(ToString::to_string).collect(),
        dietary_options: dietary_options.iter().map(ToString::to_string).collect(),
        ambiance: ambiance.to_string(),
        special_features: special_features.iter().map(ToString::to_string).collect(),
        peak: PeakSchedule::parse(windows, best_time, wait_peak, wait_off_peak)
            .expect("built-in peak windows are well-formed"),
    }
}

/// On-disk layout:
/// ```toml
/// default_city = "San Francisco"
///
/// [[city]]
/// name = "San Francisco"
///
/// [[city.venue]]
/// name = "Greens Restaurant"
/// cuisine = "Vegetarian/Vegan"
/// rating = 4.8
/// price_range = "$$$"
/// address = "Building A, Fort Mason"
/// peak_hours = "12:00-13:30, 18:00-20:00"
/// ```
#[derive(Debug, Deserialize)]
struct GuideFile {
    default_city: Option<String>,
    #[serde(default)]
    city: Vec<CityEntry>,
}

#[derive(Debug, Deserialize)]
struct CityEntry {
    name: String,
    #[serde(default)]
    venue: Vec<VenueEntry>,
}

#[derive(Debug, Deserialize)]
struct VenueEntry {
    name: String,
    cuisine: String,
    rating: f32,
    price_range: String,
    address: String,
    #[serde(default)]
    weather_suitable: Vec<String>,
    #[serde(default)]
    dietary_options: Vec<String>,
    #[serde(default)]
    ambiance: String,
    #[serde(default)]
    special_features: Vec<String>,
    peak_hours: String,
    #[serde(default = "default_best_time")]
    best_time: String,
    #[serde(default = "default_wait_peak")]
    wait_peak: String,
    #[serde(default = "default_wait_off_peak")]
    wait_off_peak: String,
}

fn default_best_time() -> String {
    "Off-peak hours recommended".to_string()
}

fn default_wait_peak() -> String {
    "20-30 minutes".to_string()
}

fn default_wait_off_peak() -> String {
    "5-10 minutes".to_string()
}

impl VenueEntry {
    fn into_venue(self) -> Result<Venue> {
        let peak = PeakSchedule::parse(
            &self.peak_hours,
            &self.best_time,
            &self.wait_peak,
            &self.wait_off_peak,
        )
        .with_context(|| format!("Venue '{}'", self.name))?;

        Ok(Venue {
            name: self.name,
            cuisine: self.cuisine,
            rating: self.rating,
            price_range: self.price_range,
            address: self.address,
            weather_suitable: self.weather_suitable,
            dietary_options: self.dietary_options,
            ambiance: self.ambiance,
            special_features: self.special_features,
            peak,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn city_matching_scans_free_text() {
        let guide = VenueGuide::builtin();

        assert_eq!(
            guide.match_city("a cozy dinner spot in berlin for two"),
            "Berlin"
        );
        assert_eq!(guide.match_city("Sushi in TOKYO please"), "Tokyo");
        assert_eq!(
            guide.match_city("somewhere nice with a view"),
            "San Francisco"
        );
    }

    #[test]
    fn venues_in_is_case_insensitive_and_empty_for_unknown() {
        let guide = VenueGuide::builtin();

        assert_eq!(guide.venues_in("san francisco").len(), 3);
        assert_eq!(guide.venues_in("Berlin").len(), 3);
        assert!(guide.venues_in("Gotham").is_empty());
    }

    #[test]
    fn diet_filtering_matches_partial_option_text() {
        let guide = VenueGuide::builtin();

        let vegan: Vec<&str> = guide.for_diet("Vegan").iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vegan, ["Greens Restaurant", "Mustafa's Gemüse Kebap"]);

        // "vegetarian option available" counts as vegetarian.
        let veggie = guide.for_diet("vegetarian");
        assert!(veggie.iter().any(|v| v.name == "Ichiran Ramen"));

        assert!(guide.for_diet("kosher").is_empty());
    }

    #[test]
    fn ambiance_filtering_scans_descriptions() {
        let guide = VenueGuide::builtin();

        let romantic: Vec<&str> = guide
            .with_ambiance("romantic")
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(romantic, ["Greens Restaurant"]);

        let fine: Vec<&str> = guide
            .with_ambiance("fine dining")
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(
            fine,
            ["Gary Danko", "Nobelhart & Schmutzig", "Sukiyabashi Jiro"]
        );
    }

    #[test]
    fn peak_schedule_falls_back_for_unknown_venues() {
        let guide = VenueGuide::builtin();

        let known = guide.peak_schedule("Greens Restaurant");
        assert_eq!(known.hours_text(), "12:00-13:30, 18:00-20:00");
        assert_eq!(known.wait_peak, "30-45 minutes");

        let unknown = guide.peak_schedule("Imaginary Bistro");
        assert_eq!(unknown.best_time, "Off-peak hours recommended");
        assert_eq!(unknown.hours_text(), "12:00-14:00, 18:00-20:00");
    }

    #[test]
    fn peak_windows_answer_is_peak() {
        let guide = VenueGuide::builtin();
        let schedule = guide.peak_schedule("Greens Restaurant");

        assert!(schedule.is_peak(time(12, 30)));
        assert!(schedule.is_peak(time(18, 0)));
        assert!(!schedule.is_peak(time(15, 0)));
        assert!(!schedule.is_peak(time(22, 0)));
    }

    #[test]
    fn windows_may_wrap_past_midnight() {
        let window = PeakWindow::parse("22:00-02:00").unwrap();
        assert!(window.contains(time(23, 30)));
        assert!(window.contains(time(1, 0)));
        assert!(!window.contains(time(12, 0)));
    }

    #[test]
    fn malformed_window_is_rejected_with_context() {
        let err = PeakWindow::parse("noon to two").unwrap_err();
        assert!(err.to_string().contains("HH:MM-HH:MM"));
    }

    #[test]
    fn guide_loads_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("venues.toml");
        std::fs::write(
            &path,
            r#"
default_city = "Lisbon"

[[city]]
name = "Lisbon"

[[city.venue]]
name = "Cervejaria Ramiro"
cuisine = "Seafood"
rating = 4.7
price_range = "$$"
address = "Av. Almirante Reis 1, Lisbon"
dietary_options = ["pescatarian"]
ambiance = "lively, traditional"
peak_hours = "19:00-22:00"
"#,
        )
        .unwrap();

        let guide = VenueGuide::from_path(&path).unwrap();
        assert_eq!(guide.match_city("anywhere"), "Lisbon");

        let venue = guide.find_venue("cervejaria ramiro").unwrap();
        assert_eq!(venue.cuisine, "Seafood");
        // Optional advisory fields pick up defaults.
        assert_eq!(venue.peak.wait_peak, "20-30 minutes");
    }

    #[test]
    fn guide_rejects_unknown_default_city() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("venues.toml");
        std::fs::write(
            &path,
            "default_city = \"Mars\"\n\n[[city]]\nname = \"Lisbon\"\n",
        )
        .unwrap();

        let err = VenueGuide::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Mars"));
    }
}
