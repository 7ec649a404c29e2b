//! Language-model backend. The crew only ever sees [`LanguageModel`]; the
//! shipped implementation talks to a local Ollama server.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

use crate::config::ModelConfig;

/// Local models can take a while on long prompts.
const GENERATE_TIMEOUT_SECS: u64 = 120;

#[async_trait]
pub trait LanguageModel: Send + Sync + Debug {
    /// One prompt in, one completion out.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for an Ollama server's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaModel {
    http: Client,
    generate_url: String,
    model: String,
    options: GenerateOptions,
}

impl OllamaModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(GENERATE_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client for the model backend")?;

        let generate_url = format!("{}/api/generate", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            generate_url,
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                num_ctx: config.context_window,
            },
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: &self.options,
        };

        let res = self
            .http
            .post(&self.generate_url)
            .json(&request)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to reach the Ollama server at {}.\n\
                     Hint: is `ollama serve` running?",
                    self.generate_url
                )
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Ollama response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Ollama generate request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse Ollama generate JSON")?;

        Ok(parsed.response)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

/// Canned-response model for pipeline tests; records every prompt it sees.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: std::sync::Mutex<std::collections::VecDeque<String>>,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedModel {
    pub fn with_responses(responses: &[&str]) -> Self {
        Self {
            responses: std::sync::Mutex::new(
                responses.iter().map(ToString::to_string).collect(),
            ),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("ScriptedModel ran out of responses"))
    }
}
