//! Core library for the `concierge` CLI.
//!
//! This crate defines:
//! - Configuration handling (model backend, weather endpoints, venue guide)
//! - The weather-lookup unit (geocode → forecast → briefing)
//! - The immutable venue guide and the text tools built on it
//! - Agent/task/crew descriptors and the sequential pipeline runner
//!
//! It is used by `concierge-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod crew;
pub mod guide;
pub mod llm;
pub mod model;
pub mod tool;
pub mod weather;

pub use config::{Config, GuideConfig, ModelConfig, WeatherConfig};
pub use crew::{Agent, Crew, Process, RunInputs, Task, ToolCall, standard_crew};
pub use guide::VenueGuide;
pub use llm::{LanguageModel, OllamaModel};
pub use model::{GeocodeResult, WeatherSnapshot};
pub use tool::{Tool, ToolId, Toolbox};
pub use weather::{WeatherLookup, WeatherLookupError};
