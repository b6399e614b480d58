//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - Services: generation job controller, pipeline runner, event publisher, prompts
//! - Ports: interfaces the application needs from external systems
//! - DTOs: request/response payloads for the transport layer

pub mod dto;
pub mod ports;
pub mod services;
