use std::path::Path;
use std::time::Duration;

use ferry_core::{Error, ImageReference, Provider};
use ferry_registry::backoff::RetryPolicy;
use ferry_registry::client::RegistryClient;
use ferry_registry::docker::DockerError;
use ferry_registry::executor::DockerExecutor;
use mockall::{Sequence, mock};
use secrecy::SecretString;

mock! {
    Executor {}

    impl DockerExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<String, DockerError>;
        async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
        async fn exec_with_stdin(
            &self,
            args: &[String],
            stdin_data: &[u8],
        ) -> Result<String, DockerError>;
    }
}

fn client(mock: MockExecutor) -> RegistryClient<MockExecutor> {
    RegistryClient::with_executor(
        mock,
        Path::new("."),
        "ci-bot",
        SecretString::from("hunter2"),
    )
}

/// Retry policy with no real sleeping, for fast tests.
fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        op_timeout: Duration::from_secs(5),
    }
}

fn image() -> ImageReference {
    ImageReference::new("acme/web", "4f2a91c")
}

fn transient_failure() -> DockerError {
    DockerError::CommandFailed {
        args: vec![],
        stderr: "error: connection reset by peer".to_owned(),
    }
}

// ── Login / logout ──

#[tokio::test]
async fn login_pipes_password_via_stdin() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_with_stdin()
        .withf(|args, stdin| {
            args.contains(&"login".to_owned())
                && args.contains(&"--password-stdin".to_owned())
                && args.contains(&"ci-bot".to_owned())
                && stdin == b"hunter2"
        })
        .times(1)
        .returning(|_, _| Ok("Login Succeeded\n".to_owned()));

    let session = client(mock).login().await.unwrap();

    assert_eq!(session.provider(), Provider::Registry);
    assert_eq!(session.account(), Some("ci-bot"));
}

#[tokio::test]
async fn login_rejection_maps_to_authentication_failed() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_with_stdin().times(1).returning(|_, _| {
        Err(DockerError::CommandFailed {
            args: vec![],
            stderr: "unauthorized: incorrect username or password".to_owned(),
        })
    });

    let err = client(mock).login().await.unwrap_err();

    assert!(matches!(
        err,
        Error::AuthenticationFailed {
            provider: Provider::Registry,
        }
    ));
}

#[tokio::test]
async fn logout_failure_is_swallowed() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.contains(&"logout".to_owned()))
        .times(1)
        .returning(|_| {
            Err(DockerError::CommandFailed {
                args: vec![],
                stderr: "not logged in".to_owned(),
            })
        });

    let registry = client(mock);
    let session = ferry_core::Session::new(Provider::Registry);
    // Must not panic or surface the error.
    registry.logout(session).await;
}

// ── Build ──

#[tokio::test]
async fn build_invokes_docker_with_tag_and_context() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming()
        .withf(|args| {
            args.contains(&"build".to_owned())
                && args.contains(&"--tag".to_owned())
                && args.contains(&"acme/web:4f2a91c".to_owned())
        })
        .times(1)
        .returning(|_| Ok(()));

    client(mock).build(&image()).await.unwrap();
}

#[tokio::test]
async fn build_failure_maps_to_build_failed() {
    let mut mock = MockExecutor::new();

    mock.expect_exec_streaming().times(1).returning(|args| {
        Err(DockerError::CommandFailed {
            args: args.to_vec(),
            stderr: "exit code: 1".to_owned(),
        })
    });

    let err = client(mock).build(&image()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::BuildFailed { ref image, .. } if image == "acme/web:4f2a91c"
    ));
}

// ── Push ──

#[tokio::test]
async fn push_succeeds_on_first_attempt() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .withf(|args| args.contains(&"push".to_owned()))
        .times(1)
        .returning(|_| Ok(String::new()));

    client(mock).push(&image()).await.unwrap();
}

#[tokio::test]
async fn push_retries_transient_failure_then_succeeds() {
    let mut mock = MockExecutor::new();
    let mut seq = Sequence::new();

    mock.expect_exec()
        .withf(|args| args.contains(&"push".to_owned()))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(transient_failure()));
    mock.expect_exec()
        .withf(|args| args.contains(&"push".to_owned()))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(String::new()));

    let registry = client(mock).retry_policy(fast_retry(3));
    registry.push(&image()).await.unwrap();
}

#[tokio::test]
async fn push_auth_rejection_is_not_retried() {
    let mut mock = MockExecutor::new();

    mock.expect_exec().times(1).returning(|_| {
        Err(DockerError::CommandFailed {
            args: vec![],
            stderr: "denied: requested access to the resource is denied".to_owned(),
        })
    });

    let registry = client(mock).retry_policy(fast_retry(3));
    let err = registry.push(&image()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::RegistryPushFailed { attempts: 1, .. }
    ));
}

#[tokio::test]
async fn push_surfaces_attempt_count_after_exhausting_retries() {
    let mut mock = MockExecutor::new();

    mock.expect_exec()
        .times(3)
        .returning(|_| Err(transient_failure()));

    let registry = client(mock).retry_policy(fast_retry(2));
    let err = registry.push(&image()).await.unwrap_err();

    match err {
        Error::RegistryPushFailed {
            image,
            attempts,
            detail,
        } => {
            assert_eq!(image, "acme/web:4f2a91c");
            assert_eq!(attempts, 3);
            assert!(detail.contains("connection reset"));
        }
        other => panic!("expected RegistryPushFailed, got {other:?}"),
    }
}
