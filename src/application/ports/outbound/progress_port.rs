//! Progress notifier port - Delivers job progress to the client that owns the job

use async_trait::async_trait;

use crate::application::dto::ProgressMessage;
use crate::domain::value_objects::JobId;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NotifyError {
    /// No client is bound to the job (e.g. it was started over HTTP)
    #[error("No client bound to job {0}")]
    NoRoute(JobId),

    #[error("Client for job {0} has disconnected")]
    ClientGone(JobId),
}

#[async_trait]
pub trait ProgressNotifierPort: Send + Sync {
    async fn notify(&self, job_id: &JobId, message: ProgressMessage) -> Result<(), NotifyError>;

    /// Forget the client binding of a finished job
    async fn release(&self, job_id: &JobId);
}
