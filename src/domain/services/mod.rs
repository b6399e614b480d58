//! Domain services - Procedural content generation and code synthesis
//!
//! Everything here is synchronous and side-effect free apart from
//! identifier stamping. Randomness is always passed in by the caller.

pub mod code_synthesis;
pub mod code_validator;
mod godot_templates;
pub mod level_generator;
pub mod narrative_generator;
pub mod quest_generator;
pub mod story_generator;
pub mod template_engine;
mod unity_templates;

pub use code_synthesis::{parse_engine, CodeSynthesisService};
pub use code_validator::{CodeValidator, RuleError};
pub use level_generator::{LevelGenerator, LevelParams};
pub use narrative_generator::{
    clamp_to, GameNarrative, LevelSizeRange, NarrativeConfig, NarrativeGenerator,
    COMPLEXITY_RANGE, LEVEL_COUNT_RANGE, LEVEL_SIZE_RANGE, QUEST_COUNT_RANGE,
};
pub use quest_generator::{ObjectiveTemplate, QuestGenerator, QuestParams};
pub use story_generator::StoryGenerator;
pub use template_engine::{
    CodeGenerationRequest, EngineProfile, GeneratedCode, GenerationMetadata, TemplateEngine,
    TemplateError,
};
