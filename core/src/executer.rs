/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Result of an external tool invocation. `output` holds stdout followed by stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Seam between the build pipeline and helm / docker.
///
/// An `Err` means the command could not be run to completion (spawn failure or
/// timeout); a non-zero exit is reported through `CommandOutput::exit_code`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], timeout: Duration)
    -> Result<CommandOutput>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        debug!(program, args = ?args, "Executing command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.with_context(|| format!("Failed to wait for {}", program))?,
            Err(_) => bail!("{} timed out after {}s", program, timeout.as_secs()),
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(program, exit_code, output = %combined.trim_end(), "Command finished");

        Ok(CommandOutput {
            exit_code,
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_exit_code_and_combined_output() {
        let output = ProcessRunner
            .run(
                "sh",
                &args(&["-c", "echo out; echo err 1>&2; exit 3"]),
                Duration::from_secs(10),
            )
            .await
            .unwrap();

        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
        assert!(output.output.contains("out"));
        assert!(output.output.contains("err"));
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let result = ProcessRunner
            .run("sleep", &args(&["5"]), Duration::from_millis(100))
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let result = ProcessRunner
            .run(
                "addonpack-definitely-missing-binary",
                &[],
                Duration::from_secs(1),
            )
            .await;

        assert!(result.is_err());
    }
}
