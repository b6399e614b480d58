//! Client session routing for generation jobs
//!
//! Every WebSocket connection registers a sender; every job started over a
//! connection is bound to that client so its progress reaches only it.
//!
//! A route counts the runs bound to it. A client may restart a finished job
//! id before the previous run's terminal message has been delivered; that
//! message then releases only its own run and the route stays up.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::domain::value_objects::JobId;
use crate::infrastructure::websocket::ServerMessage;

/// Unique identifier for a connected client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Client not connected: {0}")]
    ClientNotConnected(ClientId),

    #[error("Generation {0} belongs to another client")]
    JobOwnedElsewhere(JobId),
}

#[derive(Debug, Clone, Copy)]
struct JobRoute {
    client_id: ClientId,
    /// Runs bound and not yet released
    runs: usize,
}

/// Connected clients and the jobs bound to them
#[derive(Debug, Default)]
pub struct SessionRegistry {
    clients: HashMap<ClientId, mpsc::UnboundedSender<ServerMessage>>,
    job_routes: HashMap<JobId, JobRoute>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, client_id: ClientId, sender: mpsc::UnboundedSender<ServerMessage>) {
        self.clients.insert(client_id, sender);
    }

    /// Remove a client and return the jobs that were bound to it
    pub fn disconnect(&mut self, client_id: ClientId) -> Vec<JobId> {
        self.clients.remove(&client_id);
        let orphaned: Vec<JobId> = self
            .job_routes
            .iter()
            .filter(|(_, route)| route.client_id == client_id)
            .map(|(job_id, _)| job_id.clone())
            .collect();
        for job_id in &orphaned {
            self.job_routes.remove(job_id);
        }
        orphaned
    }

    /// Route one run of a job to a client. Each successful bind must be
    /// paired with one [`release_job`](Self::release_job).
    pub fn bind_job(&mut self, job_id: JobId, client_id: ClientId) -> Result<(), SessionError> {
        if !self.clients.contains_key(&client_id) {
            return Err(SessionError::ClientNotConnected(client_id));
        }
        match self.job_routes.get_mut(&job_id) {
            Some(route) if route.client_id != client_id => {
                Err(SessionError::JobOwnedElsewhere(job_id))
            }
            Some(route) => {
                route.runs += 1;
                Ok(())
            }
            None => {
                self.job_routes.insert(job_id, JobRoute { client_id, runs: 1 });
                Ok(())
            }
        }
    }

    /// Release one run; the route goes away with its last run
    pub fn release_job(&mut self, job_id: &JobId) -> Option<ClientId> {
        let route = self.job_routes.get_mut(job_id)?;
        let client_id = route.client_id;
        route.runs = route.runs.saturating_sub(1);
        if route.runs == 0 {
            self.job_routes.remove(job_id);
        }
        Some(client_id)
    }

    pub fn client_for(&self, job_id: &JobId) -> Option<ClientId> {
        self.job_routes.get(job_id).map(|route| route.client_id)
    }

    pub fn jobs_for(&self, client_id: ClientId) -> Vec<JobId> {
        let mut jobs: Vec<JobId> = self
            .job_routes
            .iter()
            .filter(|(_, route)| route.client_id == client_id)
            .map(|(job_id, _)| job_id.clone())
            .collect();
        jobs.sort();
        jobs
    }

    /// Sender of the client a job is bound to
    pub fn sender_for(&self, job_id: &JobId) -> Option<&mpsc::UnboundedSender<ServerMessage>> {
        self.job_routes
            .get(job_id)
            .and_then(|route| self.clients.get(&route.client_id))
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(registry: &mut SessionRegistry) -> (ClientId, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client_id = ClientId::new();
        registry.connect(client_id, tx);
        (client_id, rx)
    }

    #[test]
    fn test_bind_and_route() {
        let mut registry = SessionRegistry::new();
        let (client, mut rx) = connected(&mut registry);
        registry.bind_job(JobId::new("job-1"), client).unwrap();

        assert_eq!(registry.client_for(&JobId::new("job-1")), Some(client));
        registry
            .sender_for(&JobId::new("job-1"))
            .unwrap()
            .send(ServerMessage::Pong)
            .unwrap();
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Pong)));
        assert!(registry.sender_for(&JobId::new("job-2")).is_none());
    }

    #[test]
    fn test_bind_rejects_unknown_client_and_foreign_job() {
        let mut registry = SessionRegistry::new();
        let (first, _rx1) = connected(&mut registry);
        let (second, _rx2) = connected(&mut registry);

        let stranger = ClientId::new();
        assert_eq!(
            registry.bind_job(JobId::new("job-1"), stranger),
            Err(SessionError::ClientNotConnected(stranger))
        );

        registry.bind_job(JobId::new("job-1"), first).unwrap();
        assert_eq!(
            registry.bind_job(JobId::new("job-1"), second),
            Err(SessionError::JobOwnedElsewhere(JobId::new("job-1")))
        );
    }

    #[test]
    fn test_disconnect_returns_orphaned_jobs() {
        let mut registry = SessionRegistry::new();
        let (first, _rx1) = connected(&mut registry);
        let (second, _rx2) = connected(&mut registry);
        registry.bind_job(JobId::new("a"), first).unwrap();
        registry.bind_job(JobId::new("b"), first).unwrap();
        registry.bind_job(JobId::new("c"), second).unwrap();

        let mut orphaned = registry.disconnect(first);
        orphaned.sort();
        assert_eq!(orphaned, vec![JobId::new("a"), JobId::new("b")]);
        assert_eq!(registry.client_count(), 1);
        assert!(registry.jobs_for(first).is_empty());
        assert_eq!(registry.jobs_for(second), vec![JobId::new("c")]);
    }

    #[test]
    fn test_release_job() {
        let mut registry = SessionRegistry::new();
        let (client, _rx) = connected(&mut registry);
        registry.bind_job(JobId::new("a"), client).unwrap();
        assert_eq!(registry.release_job(&JobId::new("a")), Some(client));
        assert_eq!(registry.release_job(&JobId::new("a")), None);
    }

    #[test]
    fn test_rebound_job_survives_previous_release() {
        let mut registry = SessionRegistry::new();
        let (client, _rx) = connected(&mut registry);
        registry.bind_job(JobId::new("a"), client).unwrap();
        registry.bind_job(JobId::new("a"), client).unwrap();

        assert_eq!(registry.release_job(&JobId::new("a")), Some(client));
        assert_eq!(registry.client_for(&JobId::new("a")), Some(client));
        assert_eq!(registry.release_job(&JobId::new("a")), Some(client));
        assert_eq!(registry.client_for(&JobId::new("a")), None);
    }

    #[test]
    fn test_disconnect_drops_every_run_of_a_route() {
        let mut registry = SessionRegistry::new();
        let (client, _rx) = connected(&mut registry);
        registry.bind_job(JobId::new("a"), client).unwrap();
        registry.bind_job(JobId::new("a"), client).unwrap();

        assert_eq!(registry.disconnect(client), vec![JobId::new("a")]);
        assert_eq!(registry.release_job(&JobId::new("a")), None);
    }
}
