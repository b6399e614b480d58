//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - HTTP: REST API routes
//! - WebSocket: Real-time progress for generation clients
//! - Ollama: LLM integration for theme, notes and asset briefs
//! - Offline content: deterministic stand-in when no LLM is available
//! - Config: Application configuration
//! - State: Shared application state
//! - Session: Connected clients and job routing

pub mod config;
pub mod http;
pub mod offline_content;
pub mod ollama;
pub mod session;
pub mod session_adapter;
pub mod state;
pub mod websocket;
