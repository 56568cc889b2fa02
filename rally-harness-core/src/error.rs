// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for rally-harness.
//!
//! Every failure of the external tool is caught at the controller boundary
//! and re-raised as one of the explicit variants below, carrying the command
//! that was attempted. No `Box<dyn Error>`, no `anyhow::Result`.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Port;

/// Top-level error type for the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    // =========================================================================
    // Cluster Lifecycle Errors
    // =========================================================================
    #[error("Port [{port}] is occupied after [{timeout_secs}] seconds")]
    PortTimeout { port: Port, timeout_secs: u64 },

    #[error("Failed to install Elasticsearch: [{command}] - {source}")]
    Installation {
        command: String,
        #[source]
        source: ProcessError,
    },

    #[error("Failed to start Elasticsearch test cluster: [{command}] - {source}")]
    Start {
        command: String,
        #[source]
        source: ProcessError,
    },

    #[error("Failed to stop Elasticsearch test cluster: [{command}] - {source}")]
    Stop {
        command: String,
        #[source]
        source: ProcessError,
    },

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(#[from] StateTransitionError),

    // =========================================================================
    // Command Construction Errors
    // =========================================================================
    #[error("Command must begin with 'esrally': [{command}]")]
    CommandUsage { command: String },

    #[error("Tool invocation failed: {0}")]
    Process(#[from] ProcessError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Rally config file not found: {path}")]
    ConfigFileMissing { path: PathBuf },

    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single external tool invocation.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to spawn [{command}]: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command [{command}] exited with status {code}: {output}")]
    NonZeroExit {
        command: String,
        code: i32,
        output: String,
    },

    #[error("Command line cannot be split into arguments: [{command}]")]
    InvalidCommandLine { command: String },

    #[error("Unexpected output from [{command}]: {reason}")]
    InvalidOutput { command: String, reason: String },
}

impl ProcessError {
    /// The command line that failed.
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::NonZeroExit { command, .. }
            | Self::InvalidCommandLine { command }
            | Self::InvalidOutput { command, .. } => command,
        }
    }
}

/// Hard validation errors for settings and typed inputs.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },
}

/// State transition errors for the cluster state machine.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Cannot transition cluster on port {port} from {from} to {to}")]
    InvalidTransition {
        port: Port,
        from: &'static str,
        to: &'static str,
    },
}

/// Errors from rendering the config template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Missing template variable: {name}")]
    MissingVariable { name: String },

    #[error("Invalid placeholder at offset {offset}")]
    InvalidPlaceholder { offset: usize },
}

/// Result type alias using HarnessError.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_timeout_display() {
        let err = HarnessError::PortTimeout {
            port: Port::new(19200).unwrap(),
            timeout_secs: 120,
        };
        assert_eq!(
            err.to_string(),
            "Port [19200] is occupied after [120] seconds"
        );
    }

    #[test]
    fn test_installation_error_carries_command_and_output() {
        let err = HarnessError::Installation {
            command: "esrally install --quiet".to_string(),
            source: ProcessError::NonZeroExit {
                command: "esrally install --quiet".to_string(),
                code: 64,
                output: "no such distribution".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("esrally install --quiet"));
        assert!(msg.contains("no such distribution"));
    }

    #[test]
    fn test_error_chain() {
        let process_err = ProcessError::InvalidCommandLine {
            command: "esrally \"".to_string(),
        };
        assert_eq!(process_err.command(), "esrally \"");
        let harness_err: HarnessError = process_err.into();
        assert!(matches!(harness_err, HarnessError::Process(_)));
    }
}
