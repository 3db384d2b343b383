use std::path::{Path, PathBuf};

use ferry_core::{Error, TestRunner};

/// Runs the project's test suite through the shell.
///
/// The pipeline treats the suite as opaque: exit status decides pass/fail
/// and the combined output feeds the failure detail.
pub struct ShellTestRunner {
    command: String,
    project_dir: PathBuf,
}

impl ShellTestRunner {
    pub fn new(command: impl Into<String>, project_dir: &Path) -> Self {
        Self {
            command: command.into(),
            project_dir: project_dir.to_path_buf(),
        }
    }
}

impl TestRunner for ShellTestRunner {
    async fn run_tests(&self) -> ferry_core::Result<String> {
        tracing::info!(command = %self.command, "running test suite");

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.project_dir)
            .output()
            .await
            .map_err(|e| Error::TestsFailed {
                detail: format!("failed to launch test command: {e}"),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(Error::TestsFailed {
                detail: tail(&combined, 40),
            })
        }
    }
}

/// Last `lines` lines of the captured output; test logs can be long and the
/// failing summary sits at the end.
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_the_last_lines() {
        let text = (1..=50).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let tailed = tail(&text, 3);
        assert_eq!(tailed, "48\n49\n50");
    }

    #[test]
    fn tail_of_short_text_is_the_whole_text() {
        assert_eq!(tail("one\ntwo", 40), "one\ntwo");
    }

    #[tokio::test]
    async fn passing_command_returns_captured_output() {
        let runner = ShellTestRunner::new("echo all green", Path::new("."));
        let output = runner.run_tests().await.unwrap();
        assert!(output.contains("all green"));
    }

    #[tokio::test]
    async fn failing_command_maps_to_tests_failed() {
        let runner = ShellTestRunner::new("echo 2 failing; exit 1", Path::new("."));
        let err = runner.run_tests().await.unwrap_err();

        assert!(matches!(
            err,
            Error::TestsFailed { ref detail } if detail.contains("2 failing")
        ));
    }
}
