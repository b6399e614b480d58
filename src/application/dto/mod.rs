//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so infrastructure (HTTP/WebSocket) can
//! serialize/deserialize request bodies and progress messages.

mod code;
mod generation;
mod narrative;
mod progress;

pub use code::{CancelGenerationBody, CancelGenerationResponse, GenerateCodeBody, ValidateCodeBody};
pub use generation::{
    AssetBrief, GameBlueprint, GeneratedGame, GenerationRequest, StartGenerationBody, DEFAULT_THEME,
};
pub use narrative::{clamp_number, LevelRequest, NarrativeRequest, QuestRequest, StoryRequest};
pub use progress::ProgressMessage;
