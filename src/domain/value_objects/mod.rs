//! Value objects - Identifiers and random source helpers

mod ids;
pub mod random;

pub use ids::{stamped_id, JobId};
