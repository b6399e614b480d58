//! Shared application state

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::RwLock;

use crate::application::ports::outbound::ContentGeneratorPort;
use crate::application::services::{GenerationController, GenerationEvent, GenerationService};
use crate::domain::services::{CodeSynthesisService, NarrativeGenerator};
use crate::infrastructure::config::{AppConfig, ContentBackend};
use crate::infrastructure::offline_content::OfflineContentGenerator;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::session::SessionRegistry;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// Connected WebSocket clients and their job routes
    pub sessions: Arc<RwLock<SessionRegistry>>,
    pub narrative: Arc<NarrativeGenerator>,
    pub code_synthesis: Arc<RwLock<CodeSynthesisService>>,
    pub generation_service: Arc<GenerationService>,
}

impl AppState {
    /// Build the state plus the receiving end of the generation event channel
    pub fn new(config: AppConfig) -> Result<(Self, UnboundedReceiver<GenerationEvent>)> {
        let content: Arc<dyn ContentGeneratorPort> = match config.content_backend {
            ContentBackend::Ollama => Arc::new(OllamaClient::new(
                &config.ollama_base_url,
                &config.ollama_model,
                config.content_timeout_secs,
            )),
            ContentBackend::Offline => Arc::new(OfflineContentGenerator::new()),
        };

        let narrative = Arc::new(NarrativeGenerator::new());
        let code_synthesis = Arc::new(RwLock::new(CodeSynthesisService::new()));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let generation_service = Arc::new(GenerationService::new(
            Arc::new(GenerationController::new()),
            content,
            narrative.clone(),
            code_synthesis.clone(),
            event_tx,
            config.pipeline_settings(),
        ));

        Ok((
            Self {
                config,
                sessions: Arc::new(RwLock::new(SessionRegistry::new())),
                narrative,
                code_synthesis,
                generation_service,
            },
            event_rx,
        ))
    }
}
