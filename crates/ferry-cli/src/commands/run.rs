use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ferry_cloud::CloudRunClient;
use ferry_core::{EngineConfig, Pipeline, PipelineState};
use ferry_registry::RegistryClient;

use crate::event::TriggerArgs;
use crate::runner::ShellTestRunner;

/// Execute the full pipeline for one trigger.
pub async fn run(
    trigger: TriggerArgs,
    test_command: &str,
    project_dir: &Path,
) -> anyhow::Result<()> {
    let config = EngineConfig::from_env()?;
    let trigger = trigger.into_trigger(project_dir)?;

    println!(
        "Pipeline run: {} on '{}' at {}",
        trigger.kind, trigger.branch, trigger.revision
    );

    let tests = ShellTestRunner::new(test_command, project_dir);
    let registry = RegistryClient::new(
        project_dir,
        config.registry_user.clone(),
        config.registry_password.clone(),
    );
    let cloud = CloudRunClient::new(
        config.cloud_project_id.clone(),
        config.cloud_credential.clone(),
    );

    // Ctrl-C cancels at the next stage boundary; a push that already
    // completed stays in the registry.
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("cancellation requested");
            flag.store(true, Ordering::SeqCst);
        }
    });

    let report = Pipeline::new(config, trigger)
        .with_cancel_flag(cancel)
        .execute(&tests, &registry, &cloud)
        .await;

    for step in &report.steps {
        println!("  {step}");
    }

    match report.state {
        PipelineState::Succeeded => {
            println!();
            println!("Pipeline succeeded");
            Ok(())
        }
        PipelineState::Failed { stage, error } => {
            anyhow::bail!("pipeline failed during {stage}: {error}")
        }
        PipelineState::Cancelled { after } => {
            anyhow::bail!("pipeline cancelled after {after}")
        }
        other => anyhow::bail!("pipeline ended in unexpected state '{}'", other.name()),
    }
}
