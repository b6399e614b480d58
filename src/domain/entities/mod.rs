//! Domain entities - Generated content and generation job state

mod code_template;
mod generation_job;
mod level;
mod quest;
mod story;
mod validation;

pub use code_template::{CodeLanguage, CodeTemplate, GameEngine, ParameterType, TemplateParameter};
pub use generation_job::{
    Agent, AgentState, AgentStatus, GenerationJob, GenerationStep, JobOutcome, JobSnapshot, Stage,
    StepStatus,
};
pub use level::{
    Challenge, ChallengeKind, Dimensions, LevelDesign, LevelLayout, PointOfInterest, PoiKind,
    Position, Reward, RewardKind, TerrainTile,
};
pub use quest::{ObjectiveKind, Quest, QuestKind, QuestObjective};
pub use story::{ElementKind, PlotDifficulty, PlotKind, PlotPoint, StoryArc, StoryElement};
pub use validation::{
    Finding, RuleCategory, RuleScope, Severity, ValidationResult, ValidationRule,
};
