//! Application configuration

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::application::services::{ContentSettings, PipelineSettings};
use crate::domain::entities::GameEngine;

/// Which content generator adapter serves the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentBackend {
    Ollama,
    Offline,
}

impl FromStr for ContentBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "offline" => Ok(Self::Offline),
            other => Err(anyhow!("Unknown content backend: {}", other)),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP/WebSocket server port
    pub server_port: u16,

    pub content_backend: ContentBackend,
    /// Ollama API base URL (OpenAI-compatible)
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub content_timeout_secs: u64,
    pub content_temperature: f32,
    pub content_max_tokens: u32,

    /// Engine used when a generation request names none
    pub default_engine: GameEngine,
    pub max_step_retries: u32,
    /// Seeds every job's random source when set
    pub generation_seed: Option<u64>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_port: var("SERVER_PORT", "3001")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            content_backend: var("CONTENT_BACKEND", "ollama")
                .parse()
                .context("CONTENT_BACKEND must be `ollama` or `offline`")?,
            ollama_base_url: var("OLLAMA_BASE_URL", "http://localhost:11434"),
            ollama_model: var("OLLAMA_MODEL", "llama3.2"),
            content_timeout_secs: var("CONTENT_TIMEOUT_SECS", "120")
                .parse()
                .context("CONTENT_TIMEOUT_SECS must be a whole number of seconds")?,
            content_temperature: var("CONTENT_TEMPERATURE", "0.7")
                .parse()
                .context("CONTENT_TEMPERATURE must be a number")?,
            content_max_tokens: var("CONTENT_MAX_TOKENS", "1024")
                .parse()
                .context("CONTENT_MAX_TOKENS must be a positive integer")?,

            default_engine: var("DEFAULT_ENGINE", "unity")
                .parse::<GameEngine>()
                .map_err(|e| anyhow!(e))
                .context("DEFAULT_ENGINE must be `unity` or `godot`")?,
            max_step_retries: var("MAX_STEP_RETRIES", "3")
                .parse()
                .context("MAX_STEP_RETRIES must be a non-negative integer")?,
            generation_seed: get("GENERATION_SEED")
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().parse())
                .transpose()
                .context("GENERATION_SEED must be an unsigned integer")?,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            default_engine: self.default_engine,
            max_step_retries: self.max_step_retries,
            seed: self.generation_seed,
            content: ContentSettings {
                temperature: self.content_temperature,
                max_tokens: self.content_max_tokens,
            },
        }
    }
}
