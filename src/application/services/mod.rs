//! Application services - Use case implementations
//!
//! The generation service runs jobs through their stages; the controller
//! tracks which jobs are active; the publisher forwards job events to clients.

pub mod generation_controller;
pub mod generation_event_publisher;
pub mod generation_service;
pub mod llm;

pub use generation_controller::{CancelCallback, ControllerEventKind, GenerationController, Subscription};
pub use generation_event_publisher::GenerationEventPublisher;
pub use generation_service::{
    GenerationError, GenerationEvent, GenerationOutcome, GenerationService, PipelineSettings,
    RetryMode,
};
pub use llm::prompt_builder::ContentSettings;
