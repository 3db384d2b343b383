use ferry_core::select_environment;

use crate::event::TriggerArgs;

/// Dry-run of the environment decision for a trigger.
///
/// Prints `production`, `staging`, or `none`. Useful for gating later CI
/// jobs on the decision without executing anything.
pub fn decide(trigger: TriggerArgs) -> anyhow::Result<()> {
    let trigger = trigger.into_decision_trigger()?;
    match select_environment(&trigger) {
        Some(environment) => println!("{environment}"),
        None => println!("none"),
    }
    Ok(())
}
