//! Session Registry Adapter - Implements ProgressNotifierPort for SessionRegistry
//!
//! This adapter wraps the concrete SessionRegistry and turns application
//! progress messages into WebSocket server messages for the owning client.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::dto::ProgressMessage;
use crate::application::ports::outbound::{NotifyError, ProgressNotifierPort};
use crate::domain::value_objects::JobId;
use crate::infrastructure::session::SessionRegistry;
use crate::infrastructure::websocket::ServerMessage;

/// Adapter that wraps SessionRegistry and implements ProgressNotifierPort
pub struct SessionRegistryAdapter {
    inner: Arc<RwLock<SessionRegistry>>,
}

impl SessionRegistryAdapter {
    pub fn new(registry: Arc<RwLock<SessionRegistry>>) -> Self {
        Self { inner: registry }
    }
}

#[async_trait]
impl ProgressNotifierPort for SessionRegistryAdapter {
    async fn notify(&self, job_id: &JobId, message: ProgressMessage) -> Result<(), NotifyError> {
        let registry = self.inner.read().await;
        let sender = registry
            .sender_for(job_id)
            .ok_or_else(|| NotifyError::NoRoute(job_id.clone()))?;
        sender
            .send(ServerMessage::from_progress(job_id, message))
            .map_err(|_| NotifyError::ClientGone(job_id.clone()))
    }

    async fn release(&self, job_id: &JobId) {
        self.inner.write().await.release_job(job_id);
    }
}
