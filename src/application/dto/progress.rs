//! Progress DTOs - What a client is told about its generation job

use serde::Serialize;

use crate::domain::entities::{Agent, JobSnapshot, Stage};

/// One message for the client that owns a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProgressMessage {
    StatusUpdate(JobSnapshot),
    Error {
        message: String,
        recoverable: bool,
        step_id: Option<Stage>,
        agent_id: Option<Agent>,
    },
    GenerationComplete {
        success: bool,
        message: String,
    },
    GenerationCancelled,
}

impl ProgressMessage {
    /// No further messages follow a terminal one
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::GenerationComplete { .. } | Self::GenerationCancelled
        )
    }
}
