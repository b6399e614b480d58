//! Outbound ports - Interfaces that the application requires from external systems

mod content_generator_port;
mod progress_port;

pub use content_generator_port::{ContentError, ContentGeneratorPort, ContentRequest};
pub use progress_port::{NotifyError, ProgressNotifierPort};
