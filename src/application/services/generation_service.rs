//! Generation Service - Runs a generation job through its stages
//!
//! A job walks `init → narrative → code → asset → finalize`. Content calls are
//! raced against the job's cancellation token. A failed content call leaves
//! the stage in `error` and, while retries remain, waits for a retry request
//! (or retries on its own in [`RetryMode::Automatic`]).
//!
//! Progress leaves the service as [`GenerationEvent`]s on an unbounded channel.
//! A job's events stop the moment it is cancelled: the cancel callback closes
//! the job's reporter under the same lock every emission takes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::rngs::StdRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::generation_controller::{lock, ControllerEventKind, GenerationController, Subscription};
use super::llm::prompt_builder::{self, ContentSettings};
use crate::application::dto::{AssetBrief, GameBlueprint, GeneratedGame, GenerationRequest};
use crate::application::ports::outbound::{ContentError, ContentGeneratorPort, ContentRequest};
use crate::domain::entities::{
    Agent, GameEngine, GenerationJob, JobOutcome, JobSnapshot, QuestKind, Stage,
};
use crate::domain::services::{
    CodeGenerationRequest, CodeSynthesisService, GameNarrative, GeneratedCode, NarrativeGenerator,
    TemplateError,
};
use crate::domain::value_objects::random::system_rng;
use crate::domain::value_objects::JobId;

/// Events emitted while a job runs
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    StatusUpdate {
        job_id: JobId,
        snapshot: JobSnapshot,
    },
    StepError {
        job_id: JobId,
        stage: Stage,
        message: String,
        recoverable: bool,
    },
    Completed {
        job_id: JobId,
        success: bool,
        message: String,
    },
    Cancelled {
        job_id: JobId,
    },
}

impl GenerationEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            Self::StatusUpdate { job_id, .. }
            | Self::StepError { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Cancelled { job_id } => job_id,
        }
    }
}

/// How a failed content call gets retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryMode {
    /// Wait for [`GenerationService::request_retry`] (the `retry_step` message)
    #[default]
    OnRequest,
    /// Retry immediately; used when no client can send a retry
    Automatic,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub default_engine: GameEngine,
    pub max_step_retries: u32,
    /// Fixed seed for reproducible narratives; entropy when `None`
    pub seed: Option<u64>,
    pub content: ContentSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_engine: GameEngine::Unity,
            max_step_retries: 3,
            seed: None,
            content: ContentSettings::default(),
        }
    }
}

#[derive(Debug)]
pub enum GenerationOutcome {
    Completed(Box<GeneratedGame>),
    Failed { stage: Stage, message: String },
    Cancelled,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generation {0} is already running")]
    AlreadyRunning(JobId),
}

#[derive(Debug, thiserror::Error)]
enum StageError {
    #[error("Generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Stage input missing: {0}")]
    MissingInput(&'static str),
}

enum RetryDecision {
    Retry,
    Cancelled,
}

/// Emits a job's events until closed
#[derive(Clone)]
struct JobReporter {
    events: UnboundedSender<GenerationEvent>,
    closed: Arc<Mutex<bool>>,
}

impl JobReporter {
    fn new(events: UnboundedSender<GenerationEvent>) -> Self {
        Self {
            events,
            closed: Arc::new(Mutex::new(false)),
        }
    }

    fn emit(&self, event: GenerationEvent) {
        let closed = lock(&self.closed);
        if *closed {
            return;
        }
        if self.events.send(event).is_err() {
            tracing::warn!("Generation event channel closed");
        }
    }

    /// Emit the terminal events and close
    fn emit_final(&self, events: Vec<GenerationEvent>) {
        let mut closed = lock(&self.closed);
        if *closed {
            return;
        }
        for event in events {
            if self.events.send(event).is_err() {
                tracing::warn!("Generation event channel closed");
            }
        }
        *closed = true;
    }

    fn close(&self) {
        *lock(&self.closed) = true;
    }
}

/// Releases a job whose run is dropped before reaching a terminal state
struct RunGuard<'a> {
    service: &'a GenerationService,
    job_id: JobId,
    retry_tx: UnboundedSender<Stage>,
    armed: bool,
}

impl RunGuard<'_> {
    /// The stages returned; the caller settles the registration
    fn finish(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.service.release_retries(&self.job_id, &self.retry_tx);
        if self.armed && self.service.controller.cancel(&self.job_id) {
            tracing::warn!(job_id = %self.job_id, "Generation abandoned mid-run, cancelled");
        }
    }
}

/// Intermediate products handed from stage to stage
#[derive(Default)]
struct Draft {
    blueprint: Option<GameBlueprint>,
    theme: Option<String>,
    narrative: Option<GameNarrative>,
    gameplay_notes: Vec<String>,
    files: Vec<GeneratedCode>,
    assets: Vec<AssetBrief>,
    game: Option<GeneratedGame>,
}

struct JobRun {
    job: GenerationJob,
    request: GenerationRequest,
    mode: RetryMode,
    reporter: JobReporter,
    token: CancellationToken,
    retry_tx: UnboundedSender<Stage>,
    retry_rx: UnboundedReceiver<Stage>,
    rng: StdRng,
    draft: Draft,
}

impl JobRun {
    fn report_status(&self) {
        self.reporter.emit(GenerationEvent::StatusUpdate {
            job_id: self.job.id().clone(),
            snapshot: self.job.snapshot(),
        });
    }
}

pub struct GenerationService {
    controller: Arc<GenerationController>,
    content: Arc<dyn ContentGeneratorPort>,
    narrative: Arc<NarrativeGenerator>,
    synthesis: Arc<RwLock<CodeSynthesisService>>,
    events: UnboundedSender<GenerationEvent>,
    settings: PipelineSettings,
    retries: Mutex<HashMap<JobId, UnboundedSender<Stage>>>,
    _cancelled: Subscription,
}

impl GenerationService {
    pub fn new(
        controller: Arc<GenerationController>,
        content: Arc<dyn ContentGeneratorPort>,
        narrative: Arc<NarrativeGenerator>,
        synthesis: Arc<RwLock<CodeSynthesisService>>,
        events: UnboundedSender<GenerationEvent>,
        settings: PipelineSettings,
    ) -> Self {
        let cancelled_tx = events.clone();
        let cancelled = controller.subscribe(ControllerEventKind::Cancelled, move |job_id| {
            let event = GenerationEvent::Cancelled {
                job_id: job_id.clone(),
            };
            if cancelled_tx.send(event).is_err() {
                tracing::warn!(job_id = %job_id, "Generation event channel closed");
            }
        });

        Self {
            controller,
            content,
            narrative,
            synthesis,
            events,
            settings,
            retries: Mutex::new(HashMap::new()),
            _cancelled: cancelled,
        }
    }

    pub fn controller(&self) -> &Arc<GenerationController> {
        &self.controller
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Register the job and run it on a new task
    pub fn start(
        self: &Arc<Self>,
        job_id: JobId,
        request: GenerationRequest,
        mode: RetryMode,
    ) -> Result<JoinHandle<GenerationOutcome>, GenerationError> {
        let run = self.register(job_id, request, mode)?;
        let service = Arc::clone(self);
        Ok(tokio::spawn(async move { service.execute(run).await }))
    }

    /// Register the job and run it to completion on the current task.
    ///
    /// Dropping the future before it resolves cancels the job.
    pub async fn run(
        &self,
        job_id: JobId,
        request: GenerationRequest,
        mode: RetryMode,
    ) -> Result<GenerationOutcome, GenerationError> {
        let run = self.register(job_id, request, mode)?;
        Ok(self.execute(run).await)
    }

    pub fn cancel(&self, job_id: &JobId) -> bool {
        self.controller.cancel(job_id)
    }

    /// Ask a job waiting on a failed stage to re-enter it.
    ///
    /// Returns false when the job is not running. A request for a stage
    /// that is not waiting is ignored by the job.
    pub fn request_retry(&self, job_id: &JobId, stage: Stage) -> bool {
        match lock(&self.retries).get(job_id) {
            Some(tx) => tx.send(stage).is_ok(),
            None => false,
        }
    }

    fn register(
        &self,
        job_id: JobId,
        request: GenerationRequest,
        mode: RetryMode,
    ) -> Result<JobRun, GenerationError> {
        let token = CancellationToken::new();
        let reporter = JobReporter::new(self.events.clone());

        let on_cancel = {
            let token = token.clone();
            let reporter = reporter.clone();
            Box::new(move || {
                reporter.close();
                token.cancel();
            })
        };
        if !self.controller.try_register(job_id.clone(), on_cancel) {
            return Err(GenerationError::AlreadyRunning(job_id));
        }

        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        lock(&self.retries).insert(job_id.clone(), retry_tx.clone());

        Ok(JobRun {
            job: GenerationJob::new(job_id),
            request,
            mode,
            reporter,
            token,
            retry_tx,
            retry_rx,
            rng: system_rng(self.settings.seed),
            draft: Draft::default(),
        })
    }

    #[tracing::instrument(skip_all, fields(job_id = %run.job.id()))]
    async fn execute(&self, mut run: JobRun) -> GenerationOutcome {
        let job_id = run.job.id().clone();
        tracing::info!(
            job_id = %job_id,
            game_type = %run.request.game_type,
            backend = self.content.backend_name(),
            "Starting generation"
        );

        let guard = RunGuard {
            service: self,
            job_id: job_id.clone(),
            retry_tx: run.retry_tx.clone(),
            armed: true,
        };
        let outcome = self.run_stages(&mut run).await;
        guard.finish();

        match outcome {
            GenerationOutcome::Cancelled => {
                run.job.finish(JobOutcome::Cancelled);
                tracing::info!(job_id = %job_id, "Generation stopped after cancellation");
                GenerationOutcome::Cancelled
            }
            // Claim the terminal state; losing the claim means a cancel won
            _ if !self.controller.complete(&job_id) => {
                run.job.finish(JobOutcome::Cancelled);
                GenerationOutcome::Cancelled
            }
            GenerationOutcome::Completed(game) => {
                run.job.finish(JobOutcome::Succeeded);
                let message = format!(
                    "Generated {} scripts and {} asset briefs",
                    game.files.len(),
                    game.assets.len()
                );
                tracing::info!(job_id = %job_id, "{}", message);
                run.reporter.emit_final(vec![GenerationEvent::Completed {
                    job_id,
                    success: true,
                    message,
                }]);
                GenerationOutcome::Completed(game)
            }
            GenerationOutcome::Failed { stage, message } => {
                run.job.finish(JobOutcome::Failed);
                tracing::error!(job_id = %job_id, stage = stage.as_str(), "Generation failed: {}", message);
                run.reporter.emit_final(vec![
                    GenerationEvent::StepError {
                        job_id: job_id.clone(),
                        stage,
                        message: message.clone(),
                        recoverable: false,
                    },
                    GenerationEvent::Completed {
                        job_id,
                        success: false,
                        message: format!("{} failed: {}", stage.display_name(), message),
                    },
                ]);
                GenerationOutcome::Failed { stage, message }
            }
        }
    }

    /// Drop the job's retry channel unless a newer run owns the slot
    fn release_retries(&self, job_id: &JobId, retry_tx: &UnboundedSender<Stage>) {
        let mut retries = lock(&self.retries);
        if retries.get(job_id).is_some_and(|tx| tx.same_channel(retry_tx)) {
            retries.remove(job_id);
        }
    }

    async fn run_stages(&self, run: &mut JobRun) -> GenerationOutcome {
        for stage in Stage::ALL {
            if run.token.is_cancelled() {
                return GenerationOutcome::Cancelled;
            }
            run.job.start_stage(stage);
            run.report_status();
            tracing::debug!(job_id = %run.job.id(), stage = stage.as_str(), "Stage started");

            loop {
                match self.run_stage(stage, run).await {
                    Ok(()) => {
                        run.job.complete_stage(stage);
                        run.report_status();
                        break;
                    }
                    Err(StageError::Cancelled) => return GenerationOutcome::Cancelled,
                    Err(StageError::Content(e))
                        if run.job.step(stage).retry_count < self.settings.max_step_retries =>
                    {
                        let message = e.to_string();
                        tracing::warn!(
                            job_id = %run.job.id(),
                            stage = stage.as_str(),
                            "Content call failed, stage can be retried: {}",
                            message
                        );
                        run.job.fail_stage(stage, message.clone());
                        // Requests sent before this failure do not count
                        while run.retry_rx.try_recv().is_ok() {}
                        run.report_status();
                        run.reporter.emit(GenerationEvent::StepError {
                            job_id: run.job.id().clone(),
                            stage,
                            message,
                            recoverable: true,
                        });

                        match Self::await_retry(stage, run).await {
                            RetryDecision::Retry => {
                                let attempt = run.job.retry_stage(stage);
                                tracing::info!(
                                    job_id = %run.job.id(),
                                    stage = stage.as_str(),
                                    attempt,
                                    "Retrying stage"
                                );
                                run.report_status();
                            }
                            RetryDecision::Cancelled => return GenerationOutcome::Cancelled,
                        }
                    }
                    Err(e) => {
                        let message = e.to_string();
                        run.job.fail_stage(stage, message.clone());
                        run.report_status();
                        return GenerationOutcome::Failed { stage, message };
                    }
                }
            }
        }

        match run.draft.game.take() {
            Some(game) => GenerationOutcome::Completed(Box::new(game)),
            None => GenerationOutcome::Failed {
                stage: Stage::Finalize,
                message: StageError::MissingInput("game").to_string(),
            },
        }
    }

    async fn await_retry(stage: Stage, run: &mut JobRun) -> RetryDecision {
        if run.mode == RetryMode::Automatic {
            return if run.token.is_cancelled() {
                RetryDecision::Cancelled
            } else {
                RetryDecision::Retry
            };
        }

        loop {
            tokio::select! {
                _ = run.token.cancelled() => return RetryDecision::Cancelled,
                requested = run.retry_rx.recv() => match requested {
                    Some(requested) if requested == stage => return RetryDecision::Retry,
                    Some(requested) => {
                        tracing::debug!(
                            job_id = %run.job.id(),
                            requested = requested.as_str(),
                            waiting = stage.as_str(),
                            "Ignoring retry for a stage that is not waiting"
                        );
                    }
                    None => {
                        run.token.cancelled().await;
                        return RetryDecision::Cancelled;
                    }
                },
            }
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(stage = stage.as_str()))]
    async fn run_stage(&self, stage: Stage, run: &mut JobRun) -> Result<(), StageError> {
        match stage {
            Stage::Init => self.init_stage(run),
            Stage::Narrative => self.narrative_stage(run).await,
            Stage::Code => self.code_stage(run).await,
            Stage::Asset => self.asset_stage(run).await,
            Stage::Finalize => Self::finalize_stage(run),
        }
    }

    fn init_stage(&self, run: &mut JobRun) -> Result<(), StageError> {
        let blueprint = GameBlueprint::derive(&run.request, self.settings.default_engine)?;
        tracing::debug!(
            job_id = %run.job.id(),
            engine = %blueprint.engine,
            complexity = blueprint.complexity,
            levels = blueprint.num_levels,
            quests = blueprint.num_quests,
            "Derived blueprint"
        );
        run.draft.blueprint = Some(blueprint);
        Ok(())
    }

    async fn narrative_stage(&self, run: &mut JobRun) -> Result<(), StageError> {
        let blueprint = run
            .draft
            .blueprint
            .clone()
            .ok_or(StageError::MissingInput("blueprint"))?;

        let request = prompt_builder::theme_request(&run.request, &blueprint, &self.settings.content);
        let reply = self.call_content(&run.token, request).await?;
        let theme = prompt_builder::parse_theme(&reply, &blueprint.theme);
        run.job.set_progress(Agent::Narrative, 40);

        let narrative = self
            .narrative
            .generate_game_narrative(&blueprint.narrative_config(&theme), &mut run.rng);
        tracing::debug!(
            job_id = %run.job.id(),
            theme = %theme,
            levels = narrative.levels.len(),
            quests = narrative.quests.len(),
            "Narrative generated"
        );

        run.draft.theme = Some(theme);
        run.draft.narrative = Some(narrative);
        Ok(())
    }

    async fn code_stage(&self, run: &mut JobRun) -> Result<(), StageError> {
        let blueprint = run
            .draft
            .blueprint
            .as_ref()
            .ok_or(StageError::MissingInput("blueprint"))?;
        let theme = run.draft.theme.as_deref().ok_or(StageError::MissingInput("theme"))?;
        let narrative = run
            .draft
            .narrative
            .as_ref()
            .ok_or(StageError::MissingInput("narrative"))?;

        let request =
            prompt_builder::gameplay_notes_request(theme, blueprint, narrative, &self.settings.content);
        let reply = self.call_content(&run.token, request).await?;
        let notes = prompt_builder::parse_notes(&reply);
        run.job.set_progress(Agent::Code, 30);

        let scripts = script_requests(blueprint.engine, theme, narrative, &notes);
        let synthesis = self.synthesis.read().await;
        let mut files = Vec::with_capacity(scripts.len());
        for script in scripts {
            let mut file = synthesis.generate_code(&script.request)?;
            if let Some(filename) = script.filename {
                file.filename = filename;
            }
            if !file.validation.valid {
                tracing::debug!(
                    job_id = %run.job.id(),
                    file = %file.filename,
                    errors = file.validation.errors.len(),
                    warnings = file.validation.warnings.len(),
                    "Generated script has validation findings"
                );
            }
            files.push(file);
        }
        drop(synthesis);

        run.draft.gameplay_notes = notes;
        run.draft.files = files;
        Ok(())
    }

    async fn asset_stage(&self, run: &mut JobRun) -> Result<(), StageError> {
        let theme = run.draft.theme.as_deref().ok_or(StageError::MissingInput("theme"))?;
        let narrative = run
            .draft
            .narrative
            .as_ref()
            .ok_or(StageError::MissingInput("narrative"))?;

        let request = prompt_builder::asset_briefs_request(theme, narrative, &self.settings.content);
        let reply = self.call_content(&run.token, request).await?;
        run.draft.assets = prompt_builder::parse_asset_briefs(&reply);
        Ok(())
    }

    fn finalize_stage(run: &mut JobRun) -> Result<(), StageError> {
        let draft = &mut run.draft;
        let blueprint = draft.blueprint.take().ok_or(StageError::MissingInput("blueprint"))?;
        let theme = draft.theme.take().ok_or(StageError::MissingInput("theme"))?;
        let narrative = draft.narrative.take().ok_or(StageError::MissingInput("narrative"))?;

        draft.game = Some(GeneratedGame {
            id: run.job.id().clone(),
            request: run.request.clone(),
            engine: blueprint.engine,
            theme,
            narrative,
            gameplay_notes: draft.gameplay_notes.join("\n"),
            files: std::mem::take(&mut draft.files),
            assets: std::mem::take(&mut draft.assets),
            completed_at: Utc::now(),
        });
        Ok(())
    }

    async fn call_content(
        &self,
        token: &CancellationToken,
        request: ContentRequest,
    ) -> Result<String, StageError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(StageError::Cancelled),
            reply = self.content.generate_text(request) => Ok(reply?),
        }
    }
}

/// A script the code stage renders
struct ScriptRequest {
    request: CodeGenerationRequest,
    /// Overrides the template's file name
    filename: Option<String>,
}

/// One script per level plus the quest log data script
fn script_requests(
    engine: GameEngine,
    theme: &str,
    narrative: &GameNarrative,
    notes: &[String],
) -> Vec<ScriptRequest> {
    let namespace = pascal_case(theme);
    let mut scripts: Vec<ScriptRequest> = narrative
        .levels
        .iter()
        .enumerate()
        .map(|(index, level)| {
            let number = index + 1;
            match engine {
                GameEngine::Unity => {
                    let mut start = vec![format!("// {}", level.name)];
                    start.extend(notes.iter().map(|note| format!("// {}", note)));
                    start.push(format!("Debug.Log({});", quoted(&format!("{} loaded", level.name))));

                    let mut request = CodeGenerationRequest::new(engine, "component")
                        .param("className", format!("Level{}Controller", number))
                        .param("startContent", start.join("\n        "));
                    if let Some(namespace) = &namespace {
                        request = request.customize("namespace", namespace.as_str());
                    }
                    ScriptRequest {
                        request,
                        filename: None,
                    }
                }
                GameEngine::Godot => {
                    let variables = [
                        format!("var level_id := {}", quoted(&level.id)),
                        format!("var level_width := {}", level.layout.dimensions.width),
                        format!("var level_height := {}", level.layout.dimensions.height),
                        format!("var difficulty := {}", level.difficulty),
                    ];
                    let mut ready: Vec<String> = notes.iter().map(|note| format!("# {}", note)).collect();
                    ready.push(format!("print({})", quoted(&format!("{} loaded", level.name))));

                    ScriptRequest {
                        request: CodeGenerationRequest::new(engine, "node")
                            .param("baseClass", "Node2D")
                            .param("variables", variables.join("\n"))
                            .param("readyContent", ready.join("\n    ")),
                        filename: Some(format!("level_{}.gd", number)),
                    }
                }
            }
        })
        .collect();

    let quest_ids: Vec<String> = narrative.quests.iter().map(|q| quoted(&q.id)).collect();
    let main_count = narrative
        .quests
        .iter()
        .filter(|q| q.kind == QuestKind::Main)
        .count();
    let quest_log = match engine {
        GameEngine::Unity => CodeGenerationRequest::new(engine, "data")
            .param("className", "QuestLog")
            .param("fileName", "QuestLog")
            .param(
                "menuPath",
                format!("{}/Quest Log", namespace.as_deref().unwrap_or("Game")),
            )
            .param(
                "properties",
                format!(
                    "public string[] questIds = {{ {} }};\n    public int mainQuestCount = {};",
                    quest_ids.join(", "),
                    main_count
                ),
            ),
        GameEngine::Godot => CodeGenerationRequest::new(engine, "resource")
            .param("className", "QuestLog")
            .param(
                "properties",
                format!(
                    "@export var quest_ids: Array[String] = [{}]\n@export var main_quest_count: int = {}",
                    quest_ids.join(", "),
                    main_count
                ),
            ),
    };
    scripts.push(ScriptRequest {
        request: quest_log,
        filename: None,
    });
    scripts
}

/// `"haunted coast"` → `HauntedCoast`; `None` when nothing usable remains
fn pascal_case(text: &str) -> Option<String> {
    let name: String = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    match name.chars().next() {
        None => None,
        Some(first) if first.is_ascii_digit() => Some(format!("Game{}", name)),
        Some(_) => Some(name),
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
