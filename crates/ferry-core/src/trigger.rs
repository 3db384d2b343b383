use serde::Deserialize;

/// Source-control event kind that started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    PullRequest,
    Push,
    Manual,
    Release,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PullRequest => "pull_request",
            Self::Push => "push",
            Self::Manual => "manual",
            Self::Release => "release",
        };
        f.write_str(s)
    }
}

/// Action carried by a release event. Only `published` releases can reach
/// production; every other action is preserved but never deploys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseAction {
    Published,
    #[serde(other)]
    Other,
}

/// Metadata for one pipeline run, supplied by the source-control event
/// source. Immutable once constructed.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineTrigger {
    pub kind: TriggerKind,
    /// Source branch the event refers to.
    pub branch: String,
    /// Commit revision to build. Image identity is derived from this.
    pub revision: String,
    /// Branch a release targets (`target_commitish` in the event payload).
    #[serde(default)]
    pub release_target: Option<String>,
    #[serde(default)]
    pub release_action: Option<ReleaseAction>,
}

impl PipelineTrigger {
    pub fn new(kind: TriggerKind, branch: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            kind,
            branch: branch.into(),
            revision: revision.into(),
            release_target: None,
            release_action: None,
        }
    }

    pub fn with_release(mut self, target: impl Into<String>, action: ReleaseAction) -> Self {
        self.release_target = Some(target.into());
        self.release_action = Some(action);
        self
    }
}
