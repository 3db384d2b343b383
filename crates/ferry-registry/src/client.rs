use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ferry_core::{ContainerRegistry, Error, ImageReference, Provider, Session};
use secrecy::{ExposeSecret, SecretString};

use crate::backoff::{RetryPolicy, backoff_delay};
use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Registry operations client, parameterized over the executor for
/// testability.
///
/// Holds the registry credentials for the lifetime of the process only;
/// the password leaves its [`SecretString`] wrapper solely as stdin to
/// `docker login`.
pub struct RegistryClient<E: DockerExecutor = RealExecutor> {
    executor: E,
    context_dir: PathBuf,
    user: String,
    password: SecretString,
    retry: RetryPolicy,
}

impl RegistryClient<RealExecutor> {
    pub fn new(context_dir: &Path, user: impl Into<String>, password: SecretString) -> Self {
        Self::with_executor(RealExecutor, context_dir, user, password)
    }
}

impl<E: DockerExecutor> RegistryClient<E> {
    pub fn with_executor(
        executor: E,
        context_dir: &Path,
        user: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            executor,
            context_dir: context_dir.to_path_buf(),
            user: user.into(),
            password,
            retry: RetryPolicy::default(),
        }
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    // ── Sessions ──

    /// Exchange the registry credentials for a logged-in session.
    ///
    /// Rejections are never retried.
    pub async fn login(&self) -> ferry_core::Result<Session> {
        let login_args = args(["login", "--username", &self.user, "--password-stdin"]);
        let result = with_timeout(
            LOGIN_TIMEOUT,
            &login_args,
            self.executor
                .exec_with_stdin(&login_args, self.password.expose_secret().as_bytes()),
        )
        .await;

        match result {
            Ok(_) => {
                tracing::info!(user = %self.user, "registry login succeeded");
                Ok(Session::with_account(Provider::Registry, self.user.clone()))
            }
            Err(error) => {
                tracing::warn!(user = %self.user, error = %error, "registry login rejected");
                Err(Error::AuthenticationFailed {
                    provider: Provider::Registry,
                })
            }
        }
    }

    /// End a registry session. Best-effort: a failed logout is logged and
    /// otherwise ignored, since the run's outcome is already decided.
    pub async fn logout(&self, session: Session) {
        let logout_args = args(["logout"]);
        if let Err(error) =
            with_timeout(LOGIN_TIMEOUT, &logout_args, self.executor.exec(&logout_args)).await
        {
            tracing::warn!(provider = %session.provider(), error = %error, "registry logout failed");
        }
    }

    // ── Images ──

    /// Build the image for `image.revision()` from the configured context
    /// directory. Local work, so no timeout applies; only network-bound
    /// operations carry one.
    pub async fn build(&self, image: &ImageReference) -> ferry_core::Result<()> {
        let tag = image.tag();
        let context = self.context_dir.display().to_string();
        let build_args = args(["build", "--tag", &tag, &context]);

        self.executor
            .exec_streaming(&build_args)
            .await
            .map_err(|error| Error::BuildFailed {
                image: tag,
                detail: error.to_string(),
            })
    }

    /// Push the image, retrying transient failures with exponential backoff.
    ///
    /// Authentication rejections are permanent and fail immediately;
    /// everything else is retried up to the policy's bound, then surfaced
    /// with the attempt count.
    pub async fn push(&self, image: &ImageReference) -> ferry_core::Result<()> {
        let tag = image.tag();
        let push_args = args(["push", &tag]);
        let mut last_error: Option<DockerError> = None;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay =
                    backoff_delay(attempt - 1, self.retry.initial_delay, self.retry.max_delay);
                tracing::warn!(
                    image = %tag,
                    attempt,
                    max_retries = self.retry.max_retries,
                    delay_ms = delay.as_millis(),
                    "retrying push after transient failure"
                );
                tokio::time::sleep(delay).await;
            }

            match with_timeout(
                self.retry.op_timeout,
                &push_args,
                self.executor.exec(&push_args),
            )
            .await
            {
                Ok(_) => {
                    tracing::info!(image = %tag, "push succeeded");
                    return Ok(());
                }
                Err(error) if error.is_auth_rejection() => {
                    tracing::warn!(image = %tag, error = %error, "push rejected by registry; not retrying");
                    return Err(Error::RegistryPushFailed {
                        image: tag,
                        attempts: attempt + 1,
                        detail: error.to_string(),
                    });
                }
                Err(error) => last_error = Some(error),
            }
        }

        let attempts = self.retry.max_retries + 1;
        tracing::error!(image = %tag, attempts, "push failed after exhausting retries");
        Err(Error::RegistryPushFailed {
            image: tag,
            attempts,
            detail: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}

impl<E: DockerExecutor> ContainerRegistry for RegistryClient<E> {
    async fn authenticate(&self) -> ferry_core::Result<Session> {
        self.login().await
    }

    async fn build_image(&self, image: &ImageReference) -> ferry_core::Result<()> {
        self.build(image).await
    }

    async fn push_image(&self, image: &ImageReference) -> ferry_core::Result<()> {
        self.push(image).await
    }

    async fn release(&self, session: Session) {
        self.logout(session).await
    }
}

// ── Helpers ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

async fn with_timeout<T>(
    duration: Duration,
    command_args: &[String],
    operation: impl Future<Output = Result<T, DockerError>>,
) -> Result<T, DockerError> {
    match tokio::time::timeout(duration, operation).await {
        Ok(result) => result,
        Err(_) => Err(DockerError::TimedOut {
            seconds: duration.as_secs(),
            args: command_args.to_vec(),
        }),
    }
}
