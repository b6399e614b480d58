//! Generation job entity - Staged progress of one generation request
//!
//! A job walks the fixed stage sequence `init → narrative → code → asset →
//! finalize`. Three agents mirror the working stages and report 0..100
//! progress. The whole state is published as a snapshot on every transition.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::JobId;

/// Named phase of a generation job, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Narrative,
    Code,
    Asset,
    Finalize,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Init,
        Stage::Narrative,
        Stage::Code,
        Stage::Asset,
        Stage::Finalize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Narrative => "narrative",
            Self::Code => "code",
            Self::Asset => "asset",
            Self::Finalize => "finalize",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Init => "Initialization",
            Self::Narrative => "Story Generation",
            Self::Code => "Code Generation",
            Self::Asset => "Asset Generation",
            Self::Finalize => "Finalization",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Init => "Setting up the generation environment",
            Self::Narrative => "Creating game narrative and mechanics",
            Self::Code => "Generating game code and logic",
            Self::Asset => "Creating game assets and resources",
            Self::Finalize => "Packaging and preparing the game",
        }
    }

    /// Agent doing the work of this stage, if any
    pub fn agent(&self) -> Option<Agent> {
        match self {
            Self::Narrative => Some(Agent::Narrative),
            Self::Code => Some(Agent::Code),
            Self::Asset => Some(Agent::Asset),
            Self::Init | Self::Finalize => None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Narrative,
    Code,
    Asset,
}

impl Agent {
    pub const ALL: [Agent; 3] = [Agent::Narrative, Agent::Code, Agent::Asset];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Narrative => "Narrative Generation",
            Self::Code => "Code Generation",
            Self::Asset => "Asset Generation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Waiting,
    InProgress,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStep {
    pub id: Stage,
    pub name: String,
    pub description: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retry_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: Agent,
    pub name: String,
    pub status: AgentState,
    pub progress: u8,
}

/// How a job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

/// Progress snapshot published on each stage transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub agents: Vec<AgentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_agent: Option<Agent>,
    pub steps: Vec<GenerationStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<Stage>,
}

#[derive(Debug, Clone)]
pub struct GenerationJob {
    id: JobId,
    steps: Vec<GenerationStep>,
    agents: Vec<AgentStatus>,
    current_step: Option<Stage>,
    current_agent: Option<Agent>,
    outcome: Option<JobOutcome>,
}

impl GenerationJob {
    pub fn new(id: JobId) -> Self {
        let steps = Stage::ALL
            .into_iter()
            .map(|stage| GenerationStep {
                id: stage,
                name: stage.display_name().to_string(),
                description: stage.description().to_string(),
                status: StepStatus::Pending,
                error: None,
                retry_count: 0,
            })
            .collect();
        let agents = Agent::ALL
            .into_iter()
            .map(|agent| AgentStatus {
                id: agent,
                name: agent.display_name().to_string(),
                status: AgentState::Waiting,
                progress: 0,
            })
            .collect();

        Self {
            id,
            steps,
            agents,
            current_step: None,
            current_agent: None,
            outcome: None,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn step(&self, stage: Stage) -> &GenerationStep {
        &self.steps[stage as usize]
    }

    pub fn agent(&self, agent: Agent) -> &AgentStatus {
        &self.agents[agent as usize]
    }

    pub fn current_step(&self) -> Option<Stage> {
        self.current_step
    }

    pub fn outcome(&self) -> Option<JobOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == Some(JobOutcome::Cancelled)
    }

    pub fn start_stage(&mut self, stage: Stage) {
        self.current_step = Some(stage);
        let step = &mut self.steps[stage as usize];
        step.status = StepStatus::InProgress;
        step.error = None;

        self.current_agent = stage.agent();
        if let Some(agent) = stage.agent() {
            let status = &mut self.agents[agent as usize];
            status.status = AgentState::InProgress;
        }
    }

    pub fn set_progress(&mut self, agent: Agent, progress: u8) {
        self.agents[agent as usize].progress = progress.min(100);
    }

    pub fn complete_stage(&mut self, stage: Stage) {
        self.steps[stage as usize].status = StepStatus::Completed;
        if let Some(agent) = stage.agent() {
            let status = &mut self.agents[agent as usize];
            status.status = AgentState::Completed;
            status.progress = 100;
        }
    }

    pub fn fail_stage(&mut self, stage: Stage, message: impl Into<String>) {
        let step = &mut self.steps[stage as usize];
        step.status = StepStatus::Error;
        step.error = Some(message.into());
        if let Some(agent) = stage.agent() {
            self.agents[agent as usize].status = AgentState::Error;
        }
    }

    /// Re-enter a failed stage; returns the new retry count
    pub fn retry_stage(&mut self, stage: Stage) -> u32 {
        self.steps[stage as usize].retry_count += 1;
        if let Some(agent) = stage.agent() {
            self.agents[agent as usize].progress = 0;
        }
        self.start_stage(stage);
        self.steps[stage as usize].retry_count
    }

    /// Record the terminal outcome; the first outcome wins
    pub fn finish(&mut self, outcome: JobOutcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            agents: self.agents.clone(),
            current_agent: self.current_agent,
            steps: self.steps.clone(),
            current_step: self.current_step,
        }
    }
}
