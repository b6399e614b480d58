//! Generation Event Publisher - Maps GenerationEvents to client progress messages
//!
//! This service listens to the GenerationEvent channel and delivers the
//! corresponding ProgressMessages through the progress notifier.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::application::dto::ProgressMessage;
use crate::application::ports::outbound::{NotifyError, ProgressNotifierPort};
use crate::application::services::generation_service::GenerationEvent;

/// Publisher that converts GenerationEvents to ProgressMessages
pub struct GenerationEventPublisher {
    notifier: Arc<dyn ProgressNotifierPort>,
}

impl GenerationEventPublisher {
    pub fn new(notifier: Arc<dyn ProgressNotifierPort>) -> Self {
        Self { notifier }
    }

    /// Run the publisher until every event sender is gone
    ///
    /// This should be spawned as a background task
    pub async fn run(self, mut generation_event_rx: UnboundedReceiver<GenerationEvent>) {
        while let Some(event) = generation_event_rx.recv().await {
            let job_id = event.job_id().clone();
            let message = Self::map_to_progress(event);
            let terminal = message.is_terminal();

            match self.notifier.notify(&job_id, message).await {
                Ok(()) => {}
                Err(NotifyError::NoRoute(_)) => {
                    tracing::debug!(job_id = %job_id, "No client bound to generation, progress dropped");
                }
                Err(e) => tracing::error!("Failed to deliver generation progress: {}", e),
            }

            if terminal {
                self.notifier.release(&job_id).await;
            }
        }
        tracing::info!("Generation event publisher shutting down");
    }

    fn map_to_progress(event: GenerationEvent) -> ProgressMessage {
        match event {
            GenerationEvent::StatusUpdate { snapshot, .. } => ProgressMessage::StatusUpdate(snapshot),
            GenerationEvent::StepError {
                stage,
                message,
                recoverable,
                ..
            } => ProgressMessage::Error {
                message,
                recoverable,
                step_id: Some(stage),
                agent_id: stage.agent(),
            },
            GenerationEvent::Completed { success, message, .. } => {
                ProgressMessage::GenerationComplete { success, message }
            }
            GenerationEvent::Cancelled { .. } => ProgressMessage::GenerationCancelled,
        }
    }
}
