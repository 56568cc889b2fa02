// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Command-line construction for the external `esrally` tool.
//!
//! Options are passed as an ordered list of typed values and rendered by a
//! pure function. Unset values never reach the command line.

use std::fmt;

use crate::error::{HarnessError, HarnessResult, ProcessError};

/// Invocation prefix every command line must start with.
pub const TOOL: &str = "esrally";

/// Value of a single command-line option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Rendered as `--opt="value"`.
    Str(String),
    /// `true` is rendered as a bare `--opt`, `false` is omitted.
    Flag(bool),
    /// Rendered as `--opt="k1:v1,k2:v2"`.
    Map(Vec<(String, String)>),
}

impl OptionValue {
    /// Whether the value is truthy and therefore rendered at all.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Flag(b) => *b,
            Self::Map(pairs) => !pairs.is_empty(),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for OptionValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<(String, String)>> for OptionValue {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Map(pairs)
    }
}

impl From<&Vec<(String, String)>> for OptionValue {
    fn from(pairs: &Vec<(String, String)>) -> Self {
        Self::Map(pairs.clone())
    }
}

/// Normalize an option name to the tool's hyphenated convention.
pub fn option_name(name: &str) -> String {
    name.replace('_', "-")
}

/// Render one option. Returns `None` for unset values.
pub fn format_cli_opt(name: &str, value: &OptionValue) -> Option<String> {
    if !value.is_set() {
        return None;
    }

    let name = option_name(name);
    let rendered = match value {
        OptionValue::Flag(_) => return Some(format!("--{}", name)),
        OptionValue::Str(s) => s.clone(),
        OptionValue::Map(pairs) => pairs
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(","),
    };

    Some(format!("--{}=\"{}\"", name, escape_double_quoted(&rendered)))
}

// Backslash and double quote are the only characters that need escaping
// inside a POSIX double-quoted word we later split with shlex.
fn escape_double_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Translate a handler name into subcommand tokens: `list_tracks` → `list tracks`.
pub fn subcommand_for_handler(handler: &str) -> String {
    handler
        .split('_')
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single `esrally` invocation. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    subcommand: String,
    options: Vec<(String, OptionValue)>,
}

impl CommandInvocation {
    /// Create an invocation for the given subcommand tokens.
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self {
            subcommand: subcommand.into(),
            options: Vec::new(),
        }
    }

    /// Create an invocation from a handler name such as `list_tracks`.
    pub fn for_handler(handler: &str) -> Self {
        Self::new(subcommand_for_handler(handler))
    }

    /// Append an option.
    pub fn option(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.options.push((name.to_string(), value.into()));
        self
    }

    /// Append an option when present.
    pub fn option_opt<V: Into<OptionValue>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.option(name, v),
            None => self,
        }
    }

    /// Subcommand tokens.
    pub fn subcommand(&self) -> &str {
        &self.subcommand
    }

    /// Options in insertion order.
    pub fn options(&self) -> &[(String, OptionValue)] {
        &self.options
    }

    /// Render the full command line.
    pub fn render(&self) -> String {
        let mut parts = vec![TOOL.to_string()];
        if !self.subcommand.is_empty() {
            parts.push(self.subcommand.clone());
        }
        parts.extend(
            self.options
                .iter()
                .filter_map(|(name, value)| format_cli_opt(name, value)),
        );
        parts.join(" ")
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Check that an explicit command line targets the external tool.
pub fn validate_cmdline(cmdline: &str) -> HarnessResult<()> {
    if !cmdline.starts_with(TOOL) {
        return Err(HarnessError::CommandUsage {
            command: cmdline.to_string(),
        });
    }
    Ok(())
}

/// Use the explicit command line when given, else render the invocation.
pub fn resolve_cmdline(
    explicit: Option<&str>,
    invocation: impl FnOnce() -> CommandInvocation,
) -> HarnessResult<String> {
    match explicit {
        Some(cmdline) => {
            validate_cmdline(cmdline)?;
            Ok(cmdline.to_string())
        }
        None => Ok(invocation().render()),
    }
}

/// Split a command line into argv with POSIX shell quoting rules.
pub fn split_cmdline(cmdline: &str) -> Result<Vec<String>, ProcessError> {
    match shlex::split(cmdline) {
        Some(args) if !args.is_empty() => Ok(args),
        _ => Err(ProcessError::InvalidCommandLine {
            command: cmdline.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_renders_bare() {
        assert_eq!(
            format_cli_opt("enable_assertions", &OptionValue::Flag(true)),
            Some("--enable-assertions".to_string())
        );
        assert_eq!(format_cli_opt("test_mode", &OptionValue::Flag(false)), None);
    }

    #[test]
    fn test_map_renders_comma_joined_pairs() {
        let value = OptionValue::Map(vec![("timeout".to_string(), "60".to_string())]);
        assert_eq!(
            format_cli_opt("client_options", &value),
            Some("--client-options=\"timeout:60\"".to_string())
        );

        let value = OptionValue::Map(vec![
            ("bulk_size".to_string(), "10".to_string()),
            ("ingest_percentage".to_string(), "50".to_string()),
        ]);
        assert_eq!(
            format_cli_opt("track_params", &value),
            Some("--track-params=\"bulk_size:10,ingest_percentage:50\"".to_string())
        );
    }

    #[test]
    fn test_string_renders_quoted() {
        assert_eq!(
            format_cli_opt("on_error", &"abort".into()),
            Some("--on-error=\"abort\"".to_string())
        );
    }

    #[test]
    fn test_unset_values_omitted() {
        assert_eq!(format_cli_opt("track", &"".into()), None);
        assert_eq!(format_cli_opt("track_params", &OptionValue::Map(vec![])), None);

        let cmd = CommandInvocation::new("race").option_opt::<String>("track", None);
        assert_eq!(cmd.render(), "esrally race");
    }

    #[test]
    fn test_handler_to_subcommand() {
        assert_eq!(subcommand_for_handler("list_tracks"), "list tracks");
        assert_eq!(subcommand_for_handler("race"), "race");
        assert_eq!(
            CommandInvocation::for_handler("list_tracks")
                .option("configuration_name", "pytest")
                .render(),
            "esrally list tracks --configuration-name=\"pytest\""
        );
    }

    #[test]
    fn test_render_preserves_option_order() {
        let cmd = CommandInvocation::new("race")
            .option("track", "geonames")
            .option("test_mode", true)
            .option("preserve_install", false)
            .option("pipeline", "benchmark-only");
        assert_eq!(
            cmd.to_string(),
            "esrally race --track=\"geonames\" --test-mode --pipeline=\"benchmark-only\""
        );
    }

    #[test]
    fn test_explicit_cmdline_requires_prefix() {
        assert!(validate_cmdline("esrally race --track=geonames").is_ok());
        let err = validate_cmdline("rally race").unwrap_err();
        assert!(matches!(err, HarnessError::CommandUsage { .. }));

        let resolved = resolve_cmdline(Some("esrally list tracks"), || {
            unreachable!("explicit command line wins")
        })
        .unwrap();
        assert_eq!(resolved, "esrally list tracks");
    }

    #[test]
    fn test_split_strips_quotes() {
        let cmd = CommandInvocation::new("race")
            .option("client_options", vec![("timeout".to_string(), "60".to_string())])
            .option("user_tag", "intention:with \"quotes\"");
        let args = split_cmdline(&cmd.render()).unwrap();
        assert_eq!(
            args,
            vec![
                "esrally",
                "race",
                "--client-options=timeout:60",
                "--user-tag=intention:with \"quotes\"",
            ]
        );
    }

    #[test]
    fn test_split_rejects_unbalanced_quotes() {
        assert!(split_cmdline("esrally race --track=\"geonames").is_err());
        assert!(split_cmdline("").is_err());
    }
}
