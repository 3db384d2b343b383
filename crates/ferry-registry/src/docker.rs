#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found — install: https://docs.docker.com/get-docker/")]
    NotFound { source: std::io::Error },

    #[error("docker command failed: {args:?}\n{stderr}")]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("docker output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("failed to write to docker stdin")]
    StdinWrite { source: std::io::Error },

    #[error("docker command timed out after {seconds}s: {args:?}")]
    TimedOut { seconds: u64, args: Vec<String> },
}

impl DockerError {
    /// Registries reject unauthenticated or unauthorized pushes with a
    /// distinctive message on stderr. Such failures are permanent; retrying
    /// them only hammers the registry with doomed requests.
    pub fn is_auth_rejection(&self) -> bool {
        match self {
            Self::CommandFailed { stderr, .. } => {
                let lower = stderr.to_lowercase();
                lower.contains("unauthorized")
                    || lower.contains("authentication required")
                    || lower.contains("access denied")
                    || lower.contains("denied: ")
            }
            _ => false,
        }
    }
}
