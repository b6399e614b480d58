//! Identifiers for generated content and generation jobs

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Build a content identifier from a prefix and the generation timestamp.
///
/// The trailing sequence number keeps identifiers minted within the same
/// millisecond distinct (e.g. every level of one narrative).
pub fn stamped_id(prefix: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), seq)
}

/// Identifier of a generation job.
///
/// Usually supplied by the client as its session id; generated when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random job id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Use the supplied id, or generate one if it is blank
    pub fn from_supplied(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::new(id),
            _ => Self::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamped_ids_are_unique() {
        let a = stamped_id("level");
        let b = stamped_id("level");
        assert!(a.starts_with("level_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_job_id_from_supplied() {
        assert_eq!(JobId::from_supplied(Some("abc")).as_str(), "abc");
        let generated = JobId::from_supplied(Some("   "));
        assert!(Uuid::parse_str(generated.as_str()).is_ok());
        assert!(Uuid::parse_str(JobId::from_supplied(None).as_str()).is_ok());
    }
}
