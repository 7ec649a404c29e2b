use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use concierge_core::{
    Config, OllamaModel, RunInputs, Toolbox, VenueGuide, WeatherLookup, standard_crew,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "concierge", version, about = "Dining concierge crew")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full recommendation pipeline for a dining preference.
    Recommend {
        /// Free-text dining preference (cuisine, city, price range, occasion...).
        preference: String,

        /// Dietary restriction to filter for, e.g. "vegan" or "gluten-free".
        #[arg(long, default_value = "no restrictions")]
        dietary: String,

        /// Desired ambiance, e.g. "romantic" or "fine dining".
        #[arg(long, default_value = "casual")]
        ambiance: String,

        /// Skip the live weather-briefing stage.
        #[arg(long)]
        no_weather: bool,
    },

    /// Print a weather briefing for a location without running the crew.
    Weather {
        /// Free-text location, e.g. "downtown Chicago".
        location: String,
    },

    /// Interactively configure the model backend.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Recommend {
                preference,
                dietary,
                ambiance,
                no_weather,
            } => recommend(&preference, &dietary, &ambiance, !no_weather).await,
            Command::Weather { location } => weather(&location).await,
            Command::Configure => configure(),
        }
    }
}

fn load_guide(config: &Config) -> Result<VenueGuide> {
    match &config.guide.path {
        Some(path) => VenueGuide::from_path(path),
        None => Ok(VenueGuide::builtin()),
    }
}

async fn recommend(
    preference: &str,
    dietary: &str,
    ambiance: &str,
    include_weather: bool,
) -> Result<()> {
    let config = Config::load()?;
    let guide = Arc::new(load_guide(&config)?);
    let lookup = WeatherLookup::new(&config.weather)?;
    let toolbox = Toolbox::standard(Arc::clone(&guide), lookup);
    let model = OllamaModel::new(&config.model)?;

    let inputs = RunInputs::for_guide(&guide, preference, dietary, ambiance);
    let crew = standard_crew(include_weather);

    println!("Starting the restaurant recommendation crew...");
    let recommendation = crew.kickoff(&inputs, &toolbox, &model).await?;

    println!("\n--- RECOMMENDATION ---\n");
    println!("{recommendation}");
    Ok(())
}

async fn weather(location: &str) -> Result<()> {
    let config = Config::load()?;
    let lookup = WeatherLookup::new(&config.weather)?;

    println!("{}", lookup.report(location).await);
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let base_url = inquire::Text::new("Ollama base URL:")
        .with_initial_value(&config.model.base_url)
        .prompt()?;
    let model = inquire::Text::new("Model name:")
        .with_initial_value(&config.model.model)
        .prompt()?;
    let temperature = inquire::CustomType::<f32>::new("Sampling temperature:")
        .with_starting_input(&config.model.temperature.to_string())
        .with_error_message("Please enter a number, e.g. 0.7")
        .prompt()?;

    config.model.base_url = base_url.trim_end_matches('/').to_string();
    config.model.model = model;
    config.model.temperature = temperature;
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommend_parses_flags_and_defaults() {
        let cli = Cli::try_parse_from([
            "concierge",
            "recommend",
            "sushi in Tokyo",
            "--dietary",
            "pescatarian",
            "--no-weather",
        ])
        .unwrap();

        match cli.command {
            Command::Recommend {
                preference,
                dietary,
                ambiance,
                no_weather,
            } => {
                assert_eq!(preference, "sushi in Tokyo");
                assert_eq!(dietary, "pescatarian");
                assert_eq!(ambiance, "casual");
                assert!(no_weather);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn weather_takes_a_location() {
        let cli = Cli::try_parse_from(["concierge", "weather", "downtown Chicago"]).unwrap();
        match cli.command {
            Command::Weather { location } => assert_eq!(location, "downtown Chicago"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
