// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Subprocess execution for the external tool.
//!
//! Two call modes: capture output and fail on non-zero exit, or return the
//! exit status without judging it. Both block until the child exits.

use std::process::{Command, Stdio};

use crate::command::split_cmdline;
use crate::error::ProcessError;

/// Exit code reported when the child was terminated by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Runs tool command lines.
pub trait ProcessRunner {
    /// Run and capture stdout as lines. Non-zero exit is an error carrying
    /// the command and its captured output.
    fn run_with_output(&self, cmdline: &str) -> Result<Vec<String>, ProcessError>;

    /// Run with inherited stdio and return the exit code.
    fn run_with_return_code(&self, cmdline: &str) -> Result<i32, ProcessError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    fn command(cmdline: &str) -> Result<Command, ProcessError> {
        let args = split_cmdline(cmdline)?;
        let mut cmd = Command::new(&args[0]);
        cmd.args(&args[1..]);
        Ok(cmd)
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run_with_output(&self, cmdline: &str) -> Result<Vec<String>, ProcessError> {
        tracing::debug!(command = %cmdline, "Running command with output capture");

        let output = Self::command(cmdline)?
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProcessError::Spawn {
                command: cmdline.to_string(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(SIGNALLED_EXIT_CODE);
            tracing::debug!(command = %cmdline, code = code, "Command failed");
            return Err(ProcessError::NonZeroExit {
                command: cmdline.to_string(),
                code,
                output: format!("{}{}", stdout, stderr).trim_end().to_string(),
            });
        }

        Ok(stdout.lines().map(str::to_string).collect())
    }

    fn run_with_return_code(&self, cmdline: &str) -> Result<i32, ProcessError> {
        tracing::debug!(command = %cmdline, "Running command");

        let status = Self::command(cmdline)?
            .stdin(Stdio::null())
            .status()
            .map_err(|e| ProcessError::Spawn {
                command: cmdline.to_string(),
                source: e,
            })?;

        Ok(status.code().unwrap_or(SIGNALLED_EXIT_CODE))
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run_with_output(&self, cmdline: &str) -> Result<Vec<String>, ProcessError> {
        (**self).run_with_output(cmdline)
    }

    fn run_with_return_code(&self, cmdline: &str) -> Result<i32, ProcessError> {
        (**self).run_with_return_code(cmdline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_capture_returns_lines() {
        let lines = SystemProcessRunner
            .run_with_output("printf \"a\\nb\\n\"")
            .unwrap();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_capture_fails_on_non_zero_exit() {
        let err = SystemProcessRunner
            .run_with_output("sh -c \"echo boom; exit 3\"")
            .unwrap_err();
        match err {
            ProcessError::NonZeroExit {
                command,
                code,
                output,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(code, 3);
                assert_eq!(output, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_return_code_does_not_fail() {
        assert_eq!(SystemProcessRunner.run_with_return_code("true").unwrap(), 0);
        assert_eq!(
            SystemProcessRunner
                .run_with_return_code("sh -c \"exit 7\"")
                .unwrap(),
            7
        );
    }

    #[test]
    fn test_spawn_failure() {
        let err = SystemProcessRunner
            .run_with_return_code("definitely-not-a-real-binary-xyz --flag")
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
