//! Content generator port - Interface for the external text model

use async_trait::async_trait;

/// A single text generation call
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRequest {
    /// Instructions framing the task
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ContentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Content request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid content response: {0}")]
    InvalidResponse(String),

    #[error("Content generator returned no text")]
    EmptyResponse,
}

/// Port for prompt-to-text generation.
///
/// Every call is a suspension point for the generation pipeline.
#[async_trait]
pub trait ContentGeneratorPort: Send + Sync {
    async fn generate_text(&self, request: ContentRequest) -> Result<String, ContentError>;

    /// Short backend name for logs
    fn backend_name(&self) -> &str;
}
