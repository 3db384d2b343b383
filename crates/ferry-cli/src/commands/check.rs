use ferry_cloud::executor::{GcloudExecutor, RealExecutor as GcloudCli};
use ferry_core::EngineConfig;
use ferry_core::config::REQUIRED_KEYS;
use ferry_registry::executor::{DockerExecutor, RealExecutor as DockerCli};

struct CheckResult {
    passed: bool,
    detail: String,
}

impl CheckResult {
    fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

/// Run all readiness checks without early return: required configuration
/// keys and collaborator CLIs. Secret values are never printed, only
/// presence.
pub async fn check() -> anyhow::Result<()> {
    let mut all_passed = true;

    println!("Configuration:");
    let missing = EngineConfig::missing_keys(|key| std::env::var(key).ok());
    for key in REQUIRED_KEYS {
        let result = if missing.iter().any(|m| m == key) {
            CheckResult::fail("missing")
        } else {
            CheckResult::ok("set")
        };
        all_passed &= result.passed;
        println!("  [{}] {key}: {}", result.icon(), result.detail);
    }

    println!();
    println!("Collaborators:");

    let docker = match DockerCli.exec(&["--version".to_owned()]).await {
        Ok(version) => CheckResult::ok(version.trim()),
        Err(e) => CheckResult::fail(&e.to_string()),
    };
    all_passed &= docker.passed;
    println!("  [{}] docker: {}", docker.icon(), docker.detail);

    let gcloud = match GcloudCli.exec(&["version".to_owned()]).await {
        Ok(version) => {
            // First line reads "Google Cloud SDK X.Y.Z".
            let line = version.lines().next().unwrap_or("unknown version");
            CheckResult::ok(line.trim())
        }
        Err(e) => CheckResult::fail(&e.to_string()),
    };
    all_passed &= gcloud.passed;
    println!("  [{}] gcloud: {}", gcloud.icon(), gcloud.detail);

    if all_passed {
        println!();
        println!("Ready to run.");
        Ok(())
    } else {
        anyhow::bail!("readiness checks failed")
    }
}
