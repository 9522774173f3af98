use std::process::Stdio;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::ports::process::{CommandLine, ProcessOutput, ProcessRunner};

/// Production `ProcessRunner` on top of `tokio::process`. The child is
/// spawned with `kill_on_drop`, so cancellation terminates it instead of
/// waiting out a grace period.
pub struct TokioProcessRunner;

#[async_trait::async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &CommandLine, cancel: &CancellationToken) -> Result<ProcessOutput> {
        which::which(&command.program)
            .wrap_err_with(|| format!("Executable '{}' not found in PATH", command.program))?;

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .wrap_err_with(|| format!("Failed to spawn '{}'", command.program))?;

        // Dropping the wait future on cancellation kills the child.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                Err(eyre!("'{}' cancelled", command.program))
            }
            output = child.wait_with_output() => {
                let output = output
                    .wrap_err_with(|| format!("Failed to wait for '{}'", command.program))?;
                Ok(ProcessOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let runner = TokioProcessRunner;
        let command = CommandLine {
            program: "echo".to_string(),
            args: vec!["hello".to_string()],
        };

        let output = runner
            .run(&command, &CancellationToken::new())
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_an_error() {
        let runner = TokioProcessRunner;
        let command = CommandLine {
            program: "false".to_string(),
            args: vec![],
        };

        let output = runner
            .run(&command, &CancellationToken::new())
            .await
            .unwrap();

        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_missing_executable_is_a_launch_failure() {
        let runner = TokioProcessRunner;
        let command = CommandLine::bare("definitely-not-a-real-binary-name");

        let result = runner.run(&command, &CancellationToken::new()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cancellation_kills_long_running_process() {
        let runner = TokioProcessRunner;
        let command = CommandLine {
            program: "sleep".to_string(),
            args: vec!["30".to_string()],
        };
        let cancel = CancellationToken::new();

        let started = std::time::Instant::now();
        let run = runner.run(&command, &cancel);
        tokio::pin!(run);

        let result = tokio::select! {
            result = &mut run => result,
            _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {
                cancel.cancel();
                run.await
            }
        };

        assert!(result.is_err());
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
