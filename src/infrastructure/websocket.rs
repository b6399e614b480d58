//! WebSocket handler for generation clients
//!
//! Clients start, cancel and retry generation jobs; job progress comes back
//! as `{type, data}` messages whose `data` always carries the `sessionId`.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::application::dto::{GenerationRequest, ProgressMessage};
use crate::application::services::{GenerationError, RetryMode};
use crate::domain::entities::{Agent, JobSnapshot, Stage};
use crate::domain::value_objects::JobId;
use crate::infrastructure::session::ClientId;
use crate::infrastructure::state::AppState;

/// Messages from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a generation job; a blank session id gets a generated one
    StartGeneration {
        #[serde(rename = "sessionId", default)]
        session_id: Option<String>,
        data: GenerationRequest,
    },
    CancelGeneration {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    /// Re-enter a stage that failed with a recoverable error
    RetryStep {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "stepId")]
        step_id: Stage,
    },
    Heartbeat,
}

/// Messages from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    StatusUpdate(StatusUpdateData),
    Error(ErrorData),
    GenerationComplete(CompletionData),
    GenerationCancelled(SessionRef),
    Pong,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateData {
    pub session_id: String,
    #[serde(flatten)]
    pub snapshot: JobSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    /// Absent when the failing message could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<Agent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionData {
    pub session_id: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    pub session_id: String,
}

impl ServerMessage {
    pub fn from_progress(job_id: &JobId, message: ProgressMessage) -> Self {
        let session_id = job_id.to_string();
        match message {
            ProgressMessage::StatusUpdate(snapshot) => {
                Self::StatusUpdate(StatusUpdateData { session_id, snapshot })
            }
            ProgressMessage::Error {
                message,
                recoverable,
                step_id,
                agent_id,
            } => Self::Error(ErrorData {
                session_id: Some(session_id),
                message,
                recoverable,
                step_id,
                agent_id,
            }),
            ProgressMessage::GenerationComplete { success, message } => {
                Self::GenerationComplete(CompletionData {
                    session_id,
                    success,
                    message,
                })
            }
            ProgressMessage::GenerationCancelled => Self::GenerationCancelled(SessionRef { session_id }),
        }
    }

    fn error(session_id: Option<String>, message: impl Into<String>, recoverable: bool) -> Self {
        Self::Error(ErrorData {
            session_id,
            message: message.into(),
            recoverable,
            step_id: None,
            agent_id: None,
        })
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let client_id = ClientId::new();

    // Create a channel for sending messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.sessions.write().await.connect(client_id, tx.clone());

    tracing::info!("New WebSocket connection established: {}", client_id);

    // Spawn a task to forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!("Failed to serialize server message: {}", e),
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if let Some(response) = handle_message(msg, &state, client_id).await {
                        if tx.send(response).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse message: {}", e);
                    let error = ServerMessage::error(None, format!("Invalid message format: {}", e), true);
                    if tx.send(error).is_err() {
                        break;
                    }
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!("WebSocket connection closed by client: {}", client_id);
                break;
            }
            Err(e) => {
                tracing::error!("WebSocket error for client {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up: cancel every job this client still owns
    let orphaned = state.sessions.write().await.disconnect(client_id);
    for job_id in orphaned {
        if state.generation_service.cancel(&job_id) {
            tracing::info!(job_id = %job_id, "Cancelled generation of disconnected client {}", client_id);
        }
    }

    send_task.abort();

    tracing::info!("WebSocket connection terminated: {}", client_id);
}

/// Handle a parsed client message, returning an immediate reply if any
async fn handle_message(
    msg: ClientMessage,
    state: &AppState,
    client_id: ClientId,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::StartGeneration { session_id, data } => {
            let job_id = JobId::from_supplied(session_id.as_deref());
            let service = &state.generation_service;

            if service.controller().is_active(&job_id) {
                return Some(ServerMessage::error(
                    Some(job_id.to_string()),
                    GenerationError::AlreadyRunning(job_id).to_string(),
                    false,
                ));
            }
            if let Err(e) = state.sessions.write().await.bind_job(job_id.clone(), client_id) {
                return Some(ServerMessage::error(Some(job_id.to_string()), e.to_string(), false));
            }

            tracing::info!(job_id = %job_id, "Client {} started a generation", client_id);
            match service.start(job_id.clone(), data, RetryMode::OnRequest) {
                // The job reports through the publisher from here on
                Ok(_handle) => None,
                Err(e) => {
                    state.sessions.write().await.release_job(&job_id);
                    Some(ServerMessage::error(Some(job_id.to_string()), e.to_string(), false))
                }
            }
        }
        ClientMessage::CancelGeneration { session_id } => {
            let job_id = JobId::new(session_id);
            if !state.generation_service.cancel(&job_id) {
                tracing::debug!(job_id = %job_id, "Cancel requested for inactive generation");
            }
            None
        }
        ClientMessage::RetryStep { session_id, step_id } => {
            let job_id = JobId::new(session_id);
            if state.generation_service.request_retry(&job_id, step_id) {
                None
            } else {
                Some(ServerMessage::error(
                    Some(job_id.to_string()),
                    format!("Generation {} is not running", job_id),
                    true,
                ))
            }
        }
        ClientMessage::Heartbeat => Some(ServerMessage::Pong),
    }
}
