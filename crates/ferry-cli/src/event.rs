use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use ferry_core::{PipelineTrigger, ReleaseAction, TriggerKind};

/// Trigger metadata flags, the CLI face of the source-control event source.
///
/// Either the individual flags or a JSON event file (the platform's event
/// payload, pre-shaped to [`PipelineTrigger`]).
#[derive(Debug, clap::Args)]
pub struct TriggerArgs {
    /// Event kind that started this run
    #[arg(long, value_enum)]
    pub event: Option<EventKind>,
    /// Source branch
    #[arg(long)]
    pub branch: Option<String>,
    /// Commit revision to build; defaults to `git rev-parse HEAD`
    #[arg(long)]
    pub revision: Option<String>,
    /// Branch a release targets
    #[arg(long)]
    pub release_target: Option<String>,
    /// Release action, e.g. `published`
    #[arg(long)]
    pub release_action: Option<String>,
    /// JSON event file, used instead of the individual flags
    #[arg(
        long,
        conflicts_with_all = ["event", "branch", "revision", "release_target", "release_action"]
    )]
    pub event_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EventKind {
    PullRequest,
    Push,
    Manual,
    Release,
}

impl From<EventKind> for TriggerKind {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::PullRequest => Self::PullRequest,
            EventKind::Push => Self::Push,
            EventKind::Manual => Self::Manual,
            EventKind::Release => Self::Release,
        }
    }
}

impl TriggerArgs {
    /// Build the trigger for a real run, resolving the revision from the
    /// checkout when omitted.
    pub fn into_trigger(mut self, project_dir: &Path) -> anyhow::Result<PipelineTrigger> {
        if let Some(path) = self.event_file.take() {
            return load_event_file(&path);
        }
        let revision = match self.revision.take() {
            Some(revision) => revision,
            None => head_revision(project_dir)?,
        };
        self.build(revision)
    }

    /// Build the trigger for a decision dry-run. The decision never reads
    /// the revision, so a placeholder avoids requiring a git checkout.
    pub fn into_decision_trigger(mut self) -> anyhow::Result<PipelineTrigger> {
        if let Some(path) = self.event_file.take() {
            return load_event_file(&path);
        }
        let revision = self.revision.take().unwrap_or_else(|| "HEAD".to_owned());
        self.build(revision)
    }

    fn build(self, revision: String) -> anyhow::Result<PipelineTrigger> {
        let kind = self
            .event
            .context("--event is required (or use --event-file)")?;
        let branch = self
            .branch
            .context("--branch is required (or use --event-file)")?;

        let mut trigger = PipelineTrigger::new(kind.into(), branch, revision);
        trigger.release_target = self.release_target;
        trigger.release_action = self.release_action.as_deref().map(parse_release_action);
        Ok(trigger)
    }
}

fn parse_release_action(action: &str) -> ReleaseAction {
    if action.eq_ignore_ascii_case("published") {
        ReleaseAction::Published
    } else {
        ReleaseAction::Other
    }
}

fn load_event_file(path: &Path) -> anyhow::Result<PipelineTrigger> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse event file {}", path.display()))
}

/// Revision of the current checkout, for runs started without explicit
/// trigger metadata.
fn head_revision(project_dir: &Path) -> anyhow::Result<String> {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(project_dir)
        .output()
        .context("failed to execute git rev-parse")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "git rev-parse exited with {}: {}",
            output.status,
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> TriggerArgs {
        TriggerArgs {
            event: None,
            branch: None,
            revision: None,
            release_target: None,
            release_action: None,
            event_file: None,
        }
    }

    #[test]
    fn decision_trigger_uses_placeholder_revision() {
        let mut args = bare_args();
        args.event = Some(EventKind::Push);
        args.branch = Some("staging".to_owned());

        let trigger = args.into_decision_trigger().unwrap();
        assert_eq!(trigger.kind, TriggerKind::Push);
        assert_eq!(trigger.revision, "HEAD");
    }

    #[test]
    fn release_action_parsing_only_recognizes_published() {
        assert_eq!(parse_release_action("published"), ReleaseAction::Published);
        assert_eq!(parse_release_action("Published"), ReleaseAction::Published);
        assert_eq!(parse_release_action("created"), ReleaseAction::Other);
        assert_eq!(parse_release_action("deleted"), ReleaseAction::Other);
    }

    #[test]
    fn missing_event_flag_is_an_error() {
        let mut args = bare_args();
        args.branch = Some("staging".to_owned());

        let err = args.into_decision_trigger().unwrap_err();
        assert!(err.to_string().contains("--event"));
    }
}
