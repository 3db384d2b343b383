use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::broker::{CredentialSet, Provider, Session};
use crate::config::EngineConfig;
use crate::error::Error;
use crate::image::ImageReference;
use crate::target::{Environment, EnvironmentTarget, select_environment};
use crate::trigger::PipelineTrigger;

/// Runs the project's own test suite. Pass/fail is opaque to the pipeline;
/// captured output is returned for the step log.
#[allow(async_fn_in_trait)]
pub trait TestRunner: Send + Sync {
    async fn run_tests(&self) -> crate::Result<String>;
}

/// Container registry collaborator. Push retries are internal to the
/// implementation; the pipeline sees only the final outcome.
#[allow(async_fn_in_trait)]
pub trait ContainerRegistry: Send + Sync {
    async fn authenticate(&self) -> crate::Result<Session>;
    async fn build_image(&self, image: &ImageReference) -> crate::Result<()>;
    async fn push_image(&self, image: &ImageReference) -> crate::Result<()>;
    /// Best-effort session release; must never fail the run.
    async fn release(&self, session: Session);
}

/// Cloud deployment platform collaborator.
#[allow(async_fn_in_trait)]
pub trait CloudPlatform: Send + Sync {
    async fn authenticate(&self) -> crate::Result<Session>;
    /// Issue one deploy call; returns the service URL.
    async fn deploy(
        &self,
        target: &EnvironmentTarget,
        image: &ImageReference,
    ) -> crate::Result<String>;
    async fn release(&self, session: Session);
}

/// Pipeline stage names, used for failure attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Testing,
    Building,
    Pushing,
    Deciding,
    Deploying,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Testing => "testing",
            Self::Building => "building",
            Self::Pushing => "pushing",
            Self::Deciding => "deciding",
            Self::Deploying => "deploying",
        };
        f.write_str(s)
    }
}

/// State of one pipeline run.
///
/// Transitions are one-way; a stage failure moves to `Failed` from any
/// non-terminal state and nothing runs afterwards. `Cancelled` is entered
/// only between stages, so a completed push is never unwound.
#[derive(Debug)]
pub enum PipelineState {
    Pending,
    Testing,
    Building,
    Pushing,
    Deciding,
    Deploying(Environment),
    Succeeded,
    Failed { stage: Stage, error: Error },
    Cancelled { after: Stage },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Testing => "testing",
            Self::Building => "building",
            Self::Pushing => "pushing",
            Self::Deciding => "deciding",
            Self::Deploying(_) => "deploying",
            Self::Succeeded => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// Whether `next` is a legal successor of this state.
    pub fn permits(&self, next: &Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Self::Failed { .. }) | (_, Self::Cancelled { .. }) => true,
            (Self::Pending, Self::Testing) => true,
            (Self::Testing, Self::Building) => true,
            (Self::Building, Self::Pushing) => true,
            (Self::Pushing, Self::Deciding) => true,
            (Self::Deciding, Self::Deploying(_)) => true,
            // A run with no deployment target completes here; not an error.
            (Self::Deciding, Self::Succeeded) => true,
            (Self::Deploying(_), Self::Succeeded) => true,
            _ => false,
        }
    }
}

/// One execution of the pipeline: the trigger it was created from, the
/// current state, and a human-readable step log.
#[derive(Debug)]
pub struct PipelineRun {
    trigger: PipelineTrigger,
    state: PipelineState,
    steps: Vec<String>,
}

impl PipelineRun {
    pub fn new(trigger: PipelineTrigger) -> Self {
        Self {
            trigger,
            state: PipelineState::Pending,
            steps: Vec::new(),
        }
    }

    pub fn trigger(&self) -> &PipelineTrigger {
        &self.trigger
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.permits(&next),
            "illegal transition {} -> {}",
            self.state.name(),
            next.name(),
        );
        tracing::debug!(from = self.state.name(), to = next.name(), "pipeline transition");
        self.state = next;
    }

    fn step(&mut self, message: impl Into<String>) {
        self.steps.push(message.into());
    }
}

/// Final report of a run: terminal state plus the step log.
#[derive(Debug)]
pub struct PipelineReport {
    pub state: PipelineState,
    pub steps: Vec<String>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.state, PipelineState::Succeeded)
    }
}

/// Sequencer for one run.
///
/// Owns the configuration and the run record; collaborators are borrowed for
/// the duration of `execute`. Sessions acquired along the way are released on
/// every exit path before the report is returned.
pub struct Pipeline {
    config: EngineConfig,
    run: PipelineRun,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(config: EngineConfig, trigger: PipelineTrigger) -> Self {
        Self {
            config,
            run: PipelineRun::new(trigger),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation flag. Setting it cancels the run at the next
    /// stage boundary; a stage in flight is never interrupted mid-operation.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub async fn execute<T, R, C>(mut self, tests: &T, registry: &R, cloud: &C) -> PipelineReport
    where
        T: TestRunner,
        R: ContainerRegistry,
        C: CloudPlatform,
    {
        let mut sessions = CredentialSet::default();
        self.drive(tests, registry, cloud, &mut sessions).await;

        // Sessions outlive every stage outcome, including failure and
        // cancellation. Release is best-effort and cannot change the state.
        for session in sessions.drain() {
            match session.provider() {
                Provider::Registry => registry.release(session).await,
                Provider::Cloud => cloud.release(session).await,
            }
        }

        let PipelineRun { state, steps, .. } = self.run;
        PipelineReport { state, steps }
    }

    async fn drive<T, R, C>(
        &mut self,
        tests: &T,
        registry: &R,
        cloud: &C,
        sessions: &mut CredentialSet,
    ) where
        T: TestRunner,
        R: ContainerRegistry,
        C: CloudPlatform,
    {
        self.run.transition(PipelineState::Testing);
        match tests.run_tests().await {
            Ok(_) => self.run.step("Tests passed"),
            Err(error) => return self.fail(Stage::Testing, error),
        }
        if self.cancelled(Stage::Testing) {
            return;
        }

        self.run.transition(PipelineState::Building);
        let image = ImageReference::new(
            self.config.image_namespace.clone(),
            self.run.trigger.revision.clone(),
        );
        match registry.build_image(&image).await {
            Ok(()) => self.run.step(format!("Built image {image}")),
            Err(error) => return self.fail(Stage::Building, error),
        }
        if self.cancelled(Stage::Building) {
            return;
        }

        self.run.transition(PipelineState::Pushing);
        match registry.authenticate().await {
            Ok(session) => sessions.insert(session),
            Err(error) => return self.fail(Stage::Pushing, error),
        }
        match registry.push_image(&image).await {
            Ok(()) => self.run.step(format!("Pushed image {image}")),
            Err(error) => return self.fail(Stage::Pushing, error),
        }
        // A cancellation here leaves the pushed image in place; the tag is
        // content-addressed so the push needs no unwinding.
        if self.cancelled(Stage::Pushing) {
            return;
        }

        self.run.transition(PipelineState::Deciding);
        let Some(environment) = select_environment(&self.run.trigger) else {
            self.run.step("No deployment target for this trigger");
            self.run.transition(PipelineState::Succeeded);
            return;
        };
        let target = EnvironmentTarget::resolve(environment, &self.config);
        self.run.step(format!(
            "Selected {environment} (service '{}')",
            target.service
        ));

        self.run.transition(PipelineState::Deploying(environment));
        match cloud.authenticate().await {
            Ok(session) => sessions.insert(session),
            Err(error) => return self.fail(Stage::Deploying, error),
        }
        match cloud.deploy(&target, &image).await {
            Ok(url) => self
                .run
                .step(format!("Deployed {image} to '{}': {url}", target.service)),
            Err(error) => return self.fail(Stage::Deploying, error),
        }

        self.run.transition(PipelineState::Succeeded);
    }

    fn fail(&mut self, stage: Stage, error: Error) {
        tracing::error!(stage = %stage, error = %error, "pipeline stage failed");
        self.run.step(format!("Failed during {stage}: {error}"));
        self.run.transition(PipelineState::Failed { stage, error });
    }

    fn cancelled(&mut self, after: Stage) -> bool {
        if self.cancel.load(Ordering::SeqCst) {
            tracing::warn!(after = %after, "pipeline cancelled");
            self.run.step(format!("Cancelled after {after}"));
            self.run.transition(PipelineState::Cancelled { after });
            true
        } else {
            false
        }
    }
}
