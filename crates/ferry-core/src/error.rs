use crate::broker::Provider;
use crate::target::Environment;

pub type Result<T> = std::result::Result<T, Error>;

/// Terminal errors for a pipeline run. Every variant halts the run; none are
/// retried at this level (retries live inside individual stage operations).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required configuration: {}", format_names(names))]
    MissingConfiguration { names: Vec<String> },

    #[error("test suite failed\n{detail}")]
    TestsFailed { detail: String },

    #[error("image build failed for {image}: {detail}")]
    BuildFailed { image: String, detail: String },

    #[error("registry push failed for {image} after {attempts} attempt(s): {detail}")]
    RegistryPushFailed {
        image: String,
        attempts: u32,
        detail: String,
    },

    #[error("authentication failed for {provider}")]
    AuthenticationFailed { provider: Provider },

    #[error("deployment rejected for service '{service}' ({environment}): {detail}")]
    DeploymentRejected {
        environment: Environment,
        service: String,
        detail: String,
    },
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join(", ")
    }
}
