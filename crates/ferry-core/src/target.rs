use crate::config::EngineConfig;
use crate::trigger::{PipelineTrigger, ReleaseAction, TriggerKind};

const MAIN_BRANCH: &str = "main";

/// Logical deployment destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Staging,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Staging => "staging",
            Self::Production => "production",
        };
        f.write_str(s)
    }
}

/// Concrete deployment destination: the environment plus its service
/// identity. Derived from configuration, never chosen at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentTarget {
    pub environment: Environment,
    pub region: String,
    pub service: String,
    /// Cloud Run traffic tag; distinct per environment so redeploys update
    /// traffic under a stable identifier.
    pub traffic_tag: String,
}

impl EnvironmentTarget {
    pub fn resolve(environment: Environment, config: &EngineConfig) -> Self {
        let (service, traffic_tag) = match environment {
            Environment::Production => (config.production_service.clone(), "live"),
            Environment::Staging => (config.staging_service.clone(), "staging"),
        };
        Self {
            environment,
            region: config.region.clone(),
            service,
            traffic_tag: traffic_tag.to_owned(),
        }
    }
}

/// Select the deployment environment for a trigger.
///
/// Pure function of the trigger record:
/// - production iff the trigger is a release with action `published`
///   targeting `main`;
/// - staging iff the trigger is a push or manual dispatch on a branch other
///   than `main`;
/// - otherwise none. Pull requests never deploy, and neither does a push or
///   manual dispatch on `main` itself: `main` only reaches production
///   through a published release.
///
/// Returning `None` is not an error: the run completes successfully with no
/// deployment.
pub fn select_environment(trigger: &PipelineTrigger) -> Option<Environment> {
    match trigger.kind {
        TriggerKind::Release => {
            let published = trigger.release_action == Some(ReleaseAction::Published);
            let targets_main = trigger.release_target.as_deref() == Some(MAIN_BRANCH);
            (published && targets_main).then_some(Environment::Production)
        }
        TriggerKind::PullRequest => None,
        TriggerKind::Push | TriggerKind::Manual => {
            (trigger.branch != MAIN_BRANCH).then_some(Environment::Staging)
        }
    }
}
