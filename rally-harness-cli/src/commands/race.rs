// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `rally-harness race` - Run a benchmark race.
//!
//! Exits with the race's exit code.

use clap::Args;
use rally_harness_core::{HarnessSettings, RaceController, RaceOptions};

use crate::TrackArgs;

/// Parse a `key:value` pair.
fn parse_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once(':') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key:value, got '{}'", value)),
    }
}

#[derive(Args, Debug)]
pub struct RaceArgs {
    /// Track to race
    #[arg(long, required_unless_present = "cmdline")]
    pub track: Option<String>,

    /// Challenge within the track
    #[arg(long)]
    pub challenge: Option<String>,

    #[command(flatten)]
    pub tracks: TrackArgs,

    /// Client option as key:value (repeatable)
    #[arg(long = "client-option", value_parser = parse_pair)]
    pub client_options: Vec<(String, String)>,

    /// Rally configuration name, defaults to the settings' config name
    #[arg(long)]
    pub configuration_name: Option<String>,

    /// Elasticsearch plugins to install
    #[arg(long)]
    pub elasticsearch_plugins: Option<String>,

    /// Disable assertions in the load driver
    #[arg(long)]
    pub no_assertions: bool,

    /// Profile the load driver
    #[arg(long)]
    pub enable_driver_profiling: bool,

    /// Tasks to exclude
    #[arg(long)]
    pub exclude_tasks: Option<String>,

    /// Tasks to include
    #[arg(long)]
    pub include_tasks: Option<String>,

    /// Keep already running rally processes
    #[arg(long)]
    pub no_kill_running_processes: bool,

    /// Behaviour on request errors
    #[arg(long)]
    pub on_error: Option<String>,

    /// Rally pipeline
    #[arg(long)]
    pub pipeline: Option<String>,

    /// Plugin parameter as key:value (repeatable)
    #[arg(long = "plugin-param", value_parser = parse_pair)]
    pub plugin_params: Vec<(String, String)>,

    /// Keep the benchmark candidate installed
    #[arg(long)]
    pub preserve_install: bool,

    #[arg(long)]
    pub report_file: Option<String>,

    #[arg(long)]
    pub report_format: Option<String>,

    #[arg(long)]
    pub report_numbers_align: Option<String>,

    #[arg(long)]
    pub show_in_report: Option<String>,

    /// Hosts to benchmark against
    #[arg(long)]
    pub target_hosts: Option<String>,

    /// Telemetry devices to enable
    #[arg(long)]
    pub telemetry: Option<String>,

    /// Telemetry parameter as key:value (repeatable)
    #[arg(long = "telemetry-param", value_parser = parse_pair)]
    pub telemetry_params: Vec<(String, String)>,

    /// Run with the full data set instead of test mode
    #[arg(long)]
    pub no_test_mode: bool,

    /// Track parameter as key:value (repeatable)
    #[arg(long = "track-param", value_parser = parse_pair)]
    pub track_params: Vec<(String, String)>,

    #[arg(long)]
    pub user_tag: Option<String>,

    /// Full esrally command line to run instead of the rendered one
    #[arg(long)]
    pub cmdline: Option<String>,
}

impl RaceArgs {
    /// Layer the flags over the race defaults.
    pub fn to_options(&self) -> RaceOptions {
        let defaults = RaceOptions::default();
        RaceOptions {
            track: self.track.clone(),
            challenge: self.challenge.clone(),
            track_repository: self.tracks.track_repository.clone(),
            track_revision: self.tracks.track_revision.clone(),
            client_options: self.client_options.clone(),
            configuration_name: self.configuration_name.clone(),
            elasticsearch_plugins: self.elasticsearch_plugins.clone(),
            enable_assertions: !self.no_assertions,
            enable_driver_profiling: self.enable_driver_profiling,
            exclude_tasks: self.exclude_tasks.clone(),
            include_tasks: self.include_tasks.clone(),
            kill_running_processes: !self.no_kill_running_processes,
            on_error: self.on_error.clone().or(defaults.on_error),
            pipeline: self.pipeline.clone().or(defaults.pipeline),
            plugin_params: self.plugin_params.clone(),
            preserve_install: self.preserve_install,
            report_file: self.report_file.clone(),
            report_format: self.report_format.clone(),
            report_numbers_align: self.report_numbers_align.clone(),
            show_in_report: self.show_in_report.clone(),
            target_hosts: self.target_hosts.clone().or(defaults.target_hosts),
            telemetry: self.telemetry.clone(),
            telemetry_params: self.telemetry_params.clone(),
            test_mode: !self.no_test_mode,
            track_params: self.track_params.clone(),
            user_tag: self.user_tag.clone(),
            cmdline: self.cmdline.clone(),
        }
    }
}

pub fn execute(settings: HarnessSettings, args: &RaceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rally = RaceController::new(settings.race);

    match rally.race(&args.to_options())? {
        None => {
            println!("✓ Debug mode: race skipped");
            Ok(())
        }
        Some(0) => {
            println!("✓ Race finished");
            Ok(())
        }
        Some(code) => {
            eprintln!("✗ Race failed with exit code {}", code);
            std::process::exit(code);
        }
    }
}
