mod commands;
mod event;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use event::TriggerArgs;

#[derive(Parser)]
#[command(name = "ferry", about = "Deployment pipeline engine: test, build, push, deploy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one pipeline run for a trigger
    Run {
        #[command(flatten)]
        trigger: TriggerArgs,
        /// Command that runs the project's test suite
        #[arg(long, default_value = "npm test")]
        test_command: String,
        /// Project directory containing the image build context
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
    /// Print the environment a trigger would deploy to, without running anything
    Decide {
        #[command(flatten)]
        trigger: TriggerArgs,
    },
    /// Verify configuration and collaborator CLIs
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is a convenience for local runs; CI injects real variables.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            trigger,
            test_command,
            project_dir,
        } => commands::run(trigger, &test_command, &project_dir).await?,
        Commands::Decide { trigger } => commands::decide(trigger)?,
        Commands::Check => commands::check().await?,
    }

    Ok(())
}
