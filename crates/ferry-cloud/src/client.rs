use std::future::Future;
use std::time::Duration;

use ferry_core::{CloudPlatform, EnvironmentTarget, Error, ImageReference, Provider, Session};
use secrecy::{ExposeSecret, SecretString};

use crate::executor::{GcloudExecutor, RealExecutor};
use crate::gcloud::GcloudError;

const AUTH_TIMEOUT: Duration = Duration::from_secs(60);
const DEPLOY_TIMEOUT: Duration = Duration::from_secs(600);

/// Cloud Run operations client, parameterized over the executor for
/// testability.
///
/// The service-account key leaves its [`SecretString`] wrapper solely as
/// stdin to `gcloud auth activate-service-account`.
pub struct CloudRunClient<E: GcloudExecutor = RealExecutor> {
    executor: E,
    project_id: String,
    credential: SecretString,
}

impl CloudRunClient<RealExecutor> {
    pub fn new(project_id: impl Into<String>, credential: SecretString) -> Self {
        Self::with_executor(RealExecutor, project_id, credential)
    }
}

impl<E: GcloudExecutor> CloudRunClient<E> {
    pub fn with_executor(
        executor: E,
        project_id: impl Into<String>,
        credential: SecretString,
    ) -> Self {
        Self {
            executor,
            project_id: project_id.into(),
            credential,
        }
    }

    // ── Sessions ──

    /// Exchange the service-account key for an activated gcloud session.
    ///
    /// Rejections are never retried.
    pub async fn activate_service_account(&self) -> ferry_core::Result<Session> {
        let activate_args = args([
            "auth",
            "activate-service-account",
            "--key-file",
            "-",
            "--quiet",
        ]);
        let result = with_timeout(
            AUTH_TIMEOUT,
            &activate_args,
            self.executor
                .exec_with_stdin(&activate_args, self.credential.expose_secret().as_bytes()),
        )
        .await;

        if let Err(error) = result {
            tracing::warn!(error = %error, "service account activation rejected");
            return Err(Error::AuthenticationFailed {
                provider: Provider::Cloud,
            });
        }

        // The activated account's identity is needed to revoke exactly this
        // session later; if it cannot be read the session still works and
        // revocation falls back to the active account.
        let account_args = args(["config", "get-value", "account"]);
        let account = with_timeout(AUTH_TIMEOUT, &account_args, self.executor.exec(&account_args))
            .await
            .ok()
            .map(|a| a.trim().to_owned())
            .filter(|a| !a.is_empty());

        tracing::info!("cloud session activated");
        Ok(match account {
            Some(account) => Session::with_account(Provider::Cloud, account),
            None => Session::new(Provider::Cloud),
        })
    }

    /// End a cloud session. Best-effort: a failed revocation is logged and
    /// otherwise ignored, since the run's outcome is already decided.
    pub async fn revoke(&self, session: Session) {
        let mut revoke_args = args(["auth", "revoke"]);
        if let Some(account) = session.account() {
            revoke_args.push(account.to_owned());
        }
        revoke_args.push("--quiet".to_owned());

        if let Err(error) =
            with_timeout(AUTH_TIMEOUT, &revoke_args, self.executor.exec(&revoke_args)).await
        {
            tracing::warn!(error = %error, "failed to revoke cloud session");
        }
    }

    // ── Deploy ──

    /// Issue one Cloud Run deploy for the target's service.
    ///
    /// Safe to repeat with the same image and target: Cloud Run re-points
    /// the traffic tag at the (unchanged) revision. Provider rejection is
    /// fatal for the run and is not retried here.
    pub async fn deploy(
        &self,
        target: &EnvironmentTarget,
        image: &ImageReference,
    ) -> ferry_core::Result<String> {
        let tag = image.tag();
        let deploy_args = args([
            "run",
            "deploy",
            &target.service,
            "--image",
            &tag,
            "--project",
            &self.project_id,
            "--region",
            &target.region,
            "--platform",
            "managed",
            "--tag",
            &target.traffic_tag,
            "--quiet",
            "--format",
            "value(status.url)",
        ]);

        match with_timeout(DEPLOY_TIMEOUT, &deploy_args, self.executor.exec(&deploy_args)).await {
            Ok(output) => {
                let url = output.trim().to_owned();
                tracing::info!(
                    service = %target.service,
                    environment = %target.environment,
                    url = %url,
                    "deploy accepted"
                );
                Ok(url)
            }
            Err(error) => {
                tracing::error!(service = %target.service, error = %error, "deploy rejected");
                Err(Error::DeploymentRejected {
                    environment: target.environment,
                    service: target.service.clone(),
                    detail: error.to_string(),
                })
            }
        }
    }
}

impl<E: GcloudExecutor> CloudPlatform for CloudRunClient<E> {
    async fn authenticate(&self) -> ferry_core::Result<Session> {
        self.activate_service_account().await
    }

    async fn deploy(
        &self,
        target: &EnvironmentTarget,
        image: &ImageReference,
    ) -> ferry_core::Result<String> {
        CloudRunClient::deploy(self, target, image).await
    }

    async fn release(&self, session: Session) {
        self.revoke(session).await
    }
}

// ── Helpers ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

async fn with_timeout<T>(
    duration: Duration,
    command_args: &[String],
    operation: impl Future<Output = Result<T, GcloudError>>,
) -> Result<T, GcloudError> {
    match tokio::time::timeout(duration, operation).await {
        Ok(result) => result,
        Err(_) => Err(GcloudError::TimedOut {
            seconds: duration.as_secs(),
            args: command_args.to_vec(),
        }),
    }
}
