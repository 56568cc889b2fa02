// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Race controller: rally config file lifecycle and benchmark commands.
//!
//! Every recognized `esrally race` option is an explicit field of
//! [`RaceOptions`]. Track repository, track revision and configuration name
//! fall back to the controller's own values when a request leaves them unset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::command::{resolve_cmdline, CommandInvocation};
use crate::error::{HarnessError, HarnessResult};
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::template::{self, CONFIG_DIR_VAR, RALLY_CONFIG_TEMPLATE, TRACK_REPO_VAR};
use crate::tracks::{parse_track_table, TrackInfo};

/// Default configuration name; selects `rally-pytest.ini`.
pub const DEFAULT_CONFIG_NAME: &str = "pytest";

/// Default target of `esrally race`.
pub const DEFAULT_TARGET_HOSTS: &str = "127.0.0.1:19200";

/// Controller-level race settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceConfig {
    pub track_repository: Option<String>,
    pub track_revision: Option<String>,
    pub config_dir: PathBuf,
    pub config_name: String,
    pub debug: bool,
}

impl RaceConfig {
    /// Location of the rendered config file.
    pub fn config_location(&self) -> PathBuf {
        self.config_dir
            .join(format!("rally-{}.ini", self.config_name))
    }
}

/// Options of `esrally list tracks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTracksOptions {
    pub track_repository: Option<String>,
    pub track_revision: Option<String>,
    pub configuration_name: Option<String>,
    /// Full command line used verbatim instead of the rendered one.
    pub cmdline: Option<String>,
}

impl ListTracksOptions {
    fn invocation(&self) -> CommandInvocation {
        CommandInvocation::for_handler("list_tracks")
            .option_opt("track_repository", self.track_repository.as_ref())
            .option_opt("track_revision", self.track_revision.as_ref())
            .option_opt("configuration_name", self.configuration_name.as_ref())
    }
}

/// Options of `esrally race`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceOptions {
    pub track: Option<String>,
    pub challenge: Option<String>,
    pub track_repository: Option<String>,
    pub track_revision: Option<String>,
    pub client_options: Vec<(String, String)>,
    pub configuration_name: Option<String>,
    pub elasticsearch_plugins: Option<String>,
    pub enable_assertions: bool,
    pub enable_driver_profiling: bool,
    pub exclude_tasks: Option<String>,
    pub include_tasks: Option<String>,
    pub kill_running_processes: bool,
    pub on_error: Option<String>,
    pub pipeline: Option<String>,
    pub plugin_params: Vec<(String, String)>,
    pub preserve_install: bool,
    pub report_file: Option<String>,
    pub report_format: Option<String>,
    pub report_numbers_align: Option<String>,
    pub show_in_report: Option<String>,
    pub target_hosts: Option<String>,
    pub telemetry: Option<String>,
    pub telemetry_params: Vec<(String, String)>,
    pub test_mode: bool,
    pub track_params: Vec<(String, String)>,
    pub user_tag: Option<String>,
    /// Full command line used verbatim instead of the rendered one.
    pub cmdline: Option<String>,
}

impl Default for RaceOptions {
    fn default() -> Self {
        Self {
            track: None,
            challenge: None,
            track_repository: None,
            track_revision: None,
            client_options: Vec::new(),
            configuration_name: None,
            elasticsearch_plugins: None,
            enable_assertions: true,
            enable_driver_profiling: false,
            exclude_tasks: None,
            include_tasks: None,
            kill_running_processes: true,
            on_error: Some("abort".to_string()),
            pipeline: Some("benchmark-only".to_string()),
            plugin_params: Vec::new(),
            preserve_install: false,
            report_file: None,
            report_format: None,
            report_numbers_align: None,
            show_in_report: None,
            target_hosts: Some(DEFAULT_TARGET_HOSTS.to_string()),
            telemetry: None,
            telemetry_params: Vec::new(),
            test_mode: true,
            track_params: Vec::new(),
            user_tag: None,
            cmdline: None,
        }
    }
}

impl RaceOptions {
    /// Race the given track with every other option at its default.
    pub fn track(track: impl Into<String>) -> Self {
        Self {
            track: Some(track.into()),
            ..Self::default()
        }
    }

    /// Render to an invocation. Options appear in declaration order.
    pub fn invocation(&self) -> CommandInvocation {
        CommandInvocation::for_handler("race")
            .option_opt("track", self.track.as_ref())
            .option_opt("challenge", self.challenge.as_ref())
            .option_opt("track_repository", self.track_repository.as_ref())
            .option_opt("track_revision", self.track_revision.as_ref())
            .option("client_options", &self.client_options)
            .option_opt("configuration_name", self.configuration_name.as_ref())
            .option_opt("elasticsearch_plugins", self.elasticsearch_plugins.as_ref())
            .option("enable_assertions", self.enable_assertions)
            .option("enable_driver_profiling", self.enable_driver_profiling)
            .option_opt("exclude_tasks", self.exclude_tasks.as_ref())
            .option_opt("include_tasks", self.include_tasks.as_ref())
            .option("kill_running_processes", self.kill_running_processes)
            .option_opt("on_error", self.on_error.as_ref())
            .option_opt("pipeline", self.pipeline.as_ref())
            .option("plugin_params", &self.plugin_params)
            .option("preserve_install", self.preserve_install)
            .option_opt("report_file", self.report_file.as_ref())
            .option_opt("report_format", self.report_format.as_ref())
            .option_opt("report_numbers_align", self.report_numbers_align.as_ref())
            .option_opt("show_in_report", self.show_in_report.as_ref())
            .option_opt("target_hosts", self.target_hosts.as_ref())
            .option_opt("telemetry", self.telemetry.as_ref())
            .option("telemetry_params", &self.telemetry_params)
            .option("test_mode", self.test_mode)
            .option("track_params", &self.track_params)
            .option_opt("user_tag", self.user_tag.as_ref())
    }
}

/// Drives `esrally` commands that need the rendered config file.
#[derive(Debug)]
pub struct RaceController<R = SystemProcessRunner> {
    config: RaceConfig,
    revision: Option<String>,
    runner: R,
}

impl RaceController<SystemProcessRunner> {
    /// Create a controller that spawns real `esrally` processes.
    pub fn new(config: RaceConfig) -> Self {
        Self::with_runner(config, SystemProcessRunner)
    }
}

impl<R: ProcessRunner> RaceController<R> {
    /// Create a controller executing commands through `runner`.
    pub fn with_runner(config: RaceConfig, runner: R) -> Self {
        Self {
            config,
            revision: None,
            runner,
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Tool version recorded by [`configure`](Self::configure).
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn config_location(&self) -> PathBuf {
        self.config.config_location()
    }

    /// Record the tool version and write the config file.
    pub fn configure(&mut self) -> HarnessResult<()> {
        self.set_revision()?;
        self.install_config_file()
    }

    /// Query and store `esrally --version`.
    pub fn set_revision(&mut self) -> HarnessResult<()> {
        let output = self.runner.run_with_output("esrally --version")?;
        let revision = output.join("\n").trim_end().to_string();
        tracing::info!(revision = %revision, "Rally revision");
        self.revision = Some(revision);
        Ok(())
    }

    /// Render the config template to [`config_location`](Self::config_location).
    pub fn install_config_file(&self) -> HarnessResult<()> {
        let location = self.config_location();
        tracing::info!(path = %location.display(), "Writing Rally config");

        let contents = self.render_config()?;

        if let Some(parent) = location.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HarnessError::Io {
                context: "creating rally config directory",
                source: e,
            })?;
        }

        std::fs::write(&location, contents).map_err(|e| HarnessError::Io {
            context: "writing rally config file",
            source: e,
        })
    }

    /// Rendered config file contents.
    pub fn render_config(&self) -> HarnessResult<String> {
        let config_dir = self.config.config_dir.to_string_lossy();
        let track_repo = self.config.track_repository.as_deref().unwrap_or("");

        let vars: HashMap<&str, &str> = [
            (CONFIG_DIR_VAR, &*config_dir),
            (TRACK_REPO_VAR, track_repo),
        ]
        .into_iter()
        .collect();

        Ok(template::render(RALLY_CONFIG_TEMPLATE, &vars)?)
    }

    /// Remove the rendered config file. A missing file is an error.
    pub fn delete_config_file(&self) -> HarnessResult<()> {
        let location = self.config_location();
        tracing::info!(path = %location.display(), "Removing Rally config");
        remove_config(&location)
    }

    fn with_defaults(
        &self,
        repository: Option<&str>,
        revision: Option<&str>,
        configuration_name: Option<&str>,
    ) -> (Option<String>, Option<String>, Option<String>) {
        (
            repository
                .or(self.config.track_repository.as_deref())
                .map(str::to_string),
            revision
                .or(self.config.track_revision.as_deref())
                .map(str::to_string),
            Some(configuration_name.unwrap_or(self.config.config_name.as_str()).to_string()),
        )
    }

    /// Run `esrally list tracks` and return its output lines.
    pub fn list_tracks(&self, options: &ListTracksOptions) -> HarnessResult<Vec<String>> {
        let (track_repository, track_revision, configuration_name) = self.with_defaults(
            options.track_repository.as_deref(),
            options.track_revision.as_deref(),
            options.configuration_name.as_deref(),
        );
        let options = ListTracksOptions {
            track_repository,
            track_revision,
            configuration_name,
            ..options.clone()
        };

        let cmdline = resolve_cmdline(options.cmdline.as_deref(), || options.invocation())?;
        tracing::info!(command = %cmdline, "Running command");
        Ok(self.runner.run_with_output(&cmdline)?)
    }

    /// Every track with its challenges, parsed from `esrally list tracks`.
    pub fn all_tracks_and_challenges(&self) -> HarnessResult<Vec<TrackInfo>> {
        let lines = self.list_tracks(&ListTracksOptions::default())?;
        Ok(parse_track_table(&lines))
    }

    /// Run a race and return the tool's exit code.
    ///
    /// Returns `Ok(None)` in debug mode, where nothing is executed.
    pub fn race(&self, options: &RaceOptions) -> HarnessResult<Option<i32>> {
        let (track_repository, track_revision, configuration_name) = self.with_defaults(
            options.track_repository.as_deref(),
            options.track_revision.as_deref(),
            options.configuration_name.as_deref(),
        );
        let options = RaceOptions {
            track_repository,
            track_revision,
            configuration_name,
            ..options.clone()
        };

        let cmdline = resolve_cmdline(options.cmdline.as_deref(), || options.invocation())?;
        tracing::info!(command = %cmdline, "Running command");

        if self.config.debug {
            return Ok(None);
        }

        let code = self.runner.run_with_return_code(&cmdline)?;
        if code != 0 {
            tracing::warn!(command = %cmdline, code = code, "Race exited with non-zero status");
        }
        Ok(Some(code))
    }
}

fn remove_config(location: &Path) -> HarnessResult<()> {
    std::fs::remove_file(location).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => HarnessError::ConfigFileMissing {
            path: location.to_path_buf(),
        },
        _ => HarnessError::Io {
            context: "removing rally config file",
            source: e,
        },
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::testing::{ScriptedReply, ScriptedRunner};

    fn config(dir: &Path) -> RaceConfig {
        RaceConfig {
            track_repository: Some("/srv/tracks".to_string()),
            track_revision: Some("main".to_string()),
            config_dir: dir.to_path_buf(),
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            debug: false,
        }
    }

    #[test]
    fn test_config_location() {
        let cfg = config(Path::new("/home/ci/.rally"));
        assert_eq!(
            cfg.config_location(),
            PathBuf::from("/home/ci/.rally/rally-pytest.ini")
        );
    }

    #[test]
    fn test_default_race_command() {
        let cmd = RaceOptions::track("geonames").invocation().render();
        assert_eq!(
            cmd,
            "esrally race --track=\"geonames\" \
             --enable-assertions --kill-running-processes --on-error=\"abort\" \
             --pipeline=\"benchmark-only\" --target-hosts=\"127.0.0.1:19200\" --test-mode"
        );
    }

    #[test]
    fn test_race_fills_track_defaults_from_controller() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        let code = rally.race(&RaceOptions::track("geonames")).unwrap();
        assert_eq!(code, Some(0));

        let calls = runner.calls();
        assert!(calls[0].contains("--track-repository=\"/srv/tracks\""));
        assert!(calls[0].contains("--track-revision=\"main\""));
    }

    #[test]
    fn test_custom_config_name_reaches_commands() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let cfg = RaceConfig {
            config_name: "nightly".to_string(),
            ..config(dir.path())
        };
        let rally = RaceController::with_runner(cfg, &runner);

        rally.install_config_file().unwrap();
        assert!(dir.path().join("rally-nightly.ini").exists());

        rally.race(&RaceOptions::track("geonames")).unwrap();
        rally.list_tracks(&ListTracksOptions::default()).unwrap();

        let calls = runner.calls();
        assert!(calls[0].contains("--configuration-name=\"nightly\""));
        assert!(calls[1].contains("--configuration-name=\"nightly\""));
        assert!(!calls.iter().any(|c| c.contains("pytest")));
    }

    #[test]
    fn test_race_explicit_configuration_name_wins() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        let options = RaceOptions {
            configuration_name: Some("other".to_string()),
            ..RaceOptions::track("pmc")
        };
        rally.race(&options).unwrap();
        assert!(runner.calls()[0].contains("--configuration-name=\"other\""));
    }

    #[test]
    fn test_race_explicit_options_win() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        let options = RaceOptions {
            track_revision: Some("feature".to_string()),
            client_options: vec![("timeout".to_string(), "60".to_string())],
            ..RaceOptions::track("pmc")
        };
        rally.race(&options).unwrap();

        let call = &runner.calls()[0];
        assert!(call.contains("--track-revision=\"feature\""));
        assert!(call.contains("--client-options=\"timeout:60\""));
    }

    #[test]
    fn test_race_returns_non_zero_code() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        runner.push(ScriptedReply::Exit {
            code: 64,
            output: String::new(),
        });
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        assert_eq!(rally.race(&RaceOptions::track("pmc")).unwrap(), Some(64));
    }

    #[test]
    fn test_race_debug_mode_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let cfg = RaceConfig {
            debug: true,
            ..config(dir.path())
        };
        let rally = RaceController::with_runner(cfg, &runner);

        assert_eq!(rally.race(&RaceOptions::track("pmc")).unwrap(), None);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_explicit_cmdline_must_target_tool() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        let options = RaceOptions {
            cmdline: Some("rm -rf /".to_string()),
            ..RaceOptions::default()
        };
        assert!(matches!(
            rally.race(&options),
            Err(HarnessError::CommandUsage { .. })
        ));
        assert!(runner.calls().is_empty());

        let options = RaceOptions {
            cmdline: Some("esrally race --track=pmc".to_string()),
            ..RaceOptions::default()
        };
        rally.race(&options).unwrap();
        assert_eq!(runner.calls(), vec!["esrally race --track=pmc"]);
    }

    #[test]
    fn test_list_tracks_command() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        rally.list_tracks(&ListTracksOptions::default()).unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                "esrally list tracks --track-repository=\"/srv/tracks\" \
                 --track-revision=\"main\" --configuration-name=\"pytest\""
            ]
        );
    }

    #[test]
    fn test_list_tracks_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        runner.push(ScriptedReply::Exit {
            code: 1,
            output: "Cannot clone track repository".to_string(),
        });
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        let err = rally.all_tracks_and_challenges().unwrap_err();
        assert!(matches!(err, HarnessError::Process(_)));
        assert!(err.to_string().contains("Cannot clone track repository"));
    }

    #[test]
    fn test_configure_writes_config_and_revision() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(".rally");
        let runner = ScriptedRunner::new();
        runner.push(ScriptedReply::text("esrally 2.10.0\n"));
        let mut rally = RaceController::with_runner(config(&config_dir), &runner);

        rally.configure().unwrap();

        assert_eq!(rally.revision(), Some("esrally 2.10.0"));
        let written = std::fs::read_to_string(rally.config_location()).unwrap();
        assert!(written.contains(&format!("root.dir = {}/benchmarks", config_dir.display())));
        assert!(written.contains("default.url = /srv/tracks"));
        assert_eq!(runner.calls(), vec!["esrally --version"]);
    }

    #[test]
    fn test_multiline_version_keeps_line_breaks() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        runner.push(ScriptedReply::text("esrally 2.10.0\n(git revision: abc)\n"));
        let mut rally = RaceController::with_runner(config(dir.path()), &runner);

        rally.set_revision().unwrap();
        assert_eq!(rally.revision(), Some("esrally 2.10.0\n(git revision: abc)"));
    }

    #[test]
    fn test_delete_config_file() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let rally = RaceController::with_runner(config(dir.path()), &runner);

        rally.install_config_file().unwrap();
        assert!(rally.config_location().exists());

        rally.delete_config_file().unwrap();
        assert!(!rally.config_location().exists());

        assert!(matches!(
            rally.delete_config_file(),
            Err(HarnessError::ConfigFileMissing { .. })
        ));
    }
}
