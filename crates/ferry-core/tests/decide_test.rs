use ferry_core::{
    Environment, PipelineTrigger, ReleaseAction, TriggerKind, select_environment,
};
use proptest::prelude::*;

fn push(branch: &str) -> PipelineTrigger {
    PipelineTrigger::new(TriggerKind::Push, branch, "abc123")
}

fn release(target: &str, action: ReleaseAction) -> PipelineTrigger {
    PipelineTrigger::new(TriggerKind::Release, "main", "abc123").with_release(target, action)
}

#[test]
fn published_release_targeting_main_selects_production() {
    let trigger = release("main", ReleaseAction::Published);
    assert_eq!(select_environment(&trigger), Some(Environment::Production));
}

#[test]
fn unpublished_release_selects_nothing() {
    let trigger = release("main", ReleaseAction::Other);
    assert_eq!(select_environment(&trigger), None);
}

#[test]
fn release_targeting_other_branch_selects_nothing() {
    let trigger = release("develop", ReleaseAction::Published);
    assert_eq!(select_environment(&trigger), None);
}

#[test]
fn release_without_metadata_selects_nothing() {
    let trigger = PipelineTrigger::new(TriggerKind::Release, "main", "abc123");
    assert_eq!(select_environment(&trigger), None);
}

#[test]
fn push_to_feature_branch_selects_staging() {
    assert_eq!(select_environment(&push("staging")), Some(Environment::Staging));
    assert_eq!(select_environment(&push("feature/login")), Some(Environment::Staging));
}

#[test]
fn push_to_main_selects_nothing() {
    // main only reaches production through a published release.
    assert_eq!(select_environment(&push("main")), None);
}

#[test]
fn manual_dispatch_follows_the_push_rules() {
    let off_main = PipelineTrigger::new(TriggerKind::Manual, "hotfix", "abc123");
    assert_eq!(select_environment(&off_main), Some(Environment::Staging));

    let on_main = PipelineTrigger::new(TriggerKind::Manual, "main", "abc123");
    assert_eq!(select_environment(&on_main), None);
}

#[test]
fn pull_request_never_selects_an_environment() {
    let trigger = PipelineTrigger::new(TriggerKind::PullRequest, "feature", "abc123");
    assert_eq!(select_environment(&trigger), None);
}

proptest! {
    /// Pull requests never deploy, whatever branch they come from.
    #[test]
    fn pull_requests_never_deploy(branch in "[a-zA-Z0-9/_-]{1,30}") {
        let trigger = PipelineTrigger::new(TriggerKind::PullRequest, branch, "abc123");
        prop_assert_eq!(select_environment(&trigger), None);
    }

    /// The decision depends only on the trigger record, never on the
    /// revision: two triggers differing only in revision decide alike.
    #[test]
    fn decision_is_independent_of_revision(
        branch in "[a-zA-Z0-9/_-]{1,30}",
        rev_a in "[0-9a-f]{7,40}",
        rev_b in "[0-9a-f]{7,40}",
    ) {
        let a = PipelineTrigger::new(TriggerKind::Push, branch.clone(), rev_a);
        let b = PipelineTrigger::new(TriggerKind::Push, branch, rev_b);
        prop_assert_eq!(select_environment(&a), select_environment(&b));
    }

    /// Production is unreachable without the exact release triple.
    #[test]
    fn production_requires_published_release_on_main(branch in "[a-zA-Z0-9/_-]{1,30}") {
        for kind in [TriggerKind::PullRequest, TriggerKind::Push, TriggerKind::Manual] {
            let trigger = PipelineTrigger::new(kind, branch.clone(), "abc123");
            prop_assert_ne!(select_environment(&trigger), Some(Environment::Production));
        }
    }
}
