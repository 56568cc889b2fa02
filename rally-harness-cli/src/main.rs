// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! rally-harness CLI
//!
//! Command-line interface for driving esrally clusters and races.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rally_harness_core::{DistributionSpec, HarnessResult, HarnessSettings, Port};

mod commands;

/// rally-harness - Drive esrally test clusters and benchmark races
#[derive(Parser)]
#[command(name = "rally-harness")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Rally home directory; the rally config lives in <home>/.rally
    #[arg(long, env = "RALLY_HOME")]
    pub home: Option<PathBuf>,

    /// Log every esrally command instead of running it
    #[arg(long, env = "RALLY_DEBUG")]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the cluster section of the settings.
#[derive(Args, Debug, Default)]
pub struct ClusterArgs {
    /// Elasticsearch distribution version to install
    #[arg(long)]
    pub distribution_version: Option<String>,

    /// Elasticsearch source revision to install
    #[arg(long, conflicts_with = "distribution_version")]
    pub revision: Option<String>,

    /// HTTP port of the test cluster
    #[arg(long)]
    pub http_port: Option<u16>,
}

/// Overrides for the track section of the settings.
#[derive(Args, Debug, Default)]
pub struct TrackArgs {
    /// Track repository path or URL
    #[arg(long)]
    pub track_repository: Option<String>,

    /// Track repository revision
    #[arg(long)]
    pub track_revision: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install an Elasticsearch node and print its installation id
    Install {
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Start an installed node
    Start {
        /// Installation id printed by `install`
        #[arg(long)]
        installation_id: String,

        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Stop an installed node
    Stop {
        /// Installation id printed by `install`
        #[arg(long)]
        installation_id: String,

        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Install and start a node
    Up {
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Record the esrally version and write the rally config file
    Configure {
        #[command(flatten)]
        tracks: TrackArgs,
    },

    /// List tracks and their challenges
    ListTracks {
        #[command(flatten)]
        tracks: TrackArgs,
    },

    /// Run a benchmark race
    Race(commands::race::RaceArgs),

    /// Remove the rally config file written by `configure`
    DeleteConfig,
}

/// Build settings from the optional file, CLI flags and overrides.
fn load_settings(
    cli: &Cli,
    cluster: Option<&ClusterArgs>,
    tracks: Option<&TrackArgs>,
) -> HarnessResult<HarnessSettings> {
    let settings = match &cli.settings {
        Some(path) => HarnessSettings::load_file(path, cli.home.clone())?,
        None => HarnessSettings::defaults(cli.home.clone())?,
    };
    let mut settings = settings.with_debug(cli.debug);

    if let Some(args) = cluster {
        if args.distribution_version.is_some() || args.revision.is_some() {
            settings.cluster.distribution = DistributionSpec::from_options(
                args.distribution_version.clone(),
                args.revision.clone(),
            );
        }
        if let Some(port) = args.http_port {
            let port = Port::new(port)?;
            port.transport()?;
            settings.cluster.http_port = port;
        }
    }

    if let Some(args) = tracks {
        if args.track_repository.is_some() {
            settings.race.track_repository = args.track_repository.clone();
        }
        if args.track_revision.is_some() {
            settings.race.track_revision = args.track_revision.clone();
        }
    }

    Ok(settings)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    match &cli.command {
        Commands::Install { cluster } => {
            commands::cluster::install(load_settings(&cli, Some(cluster), None)?)
        }
        Commands::Start {
            installation_id,
            cluster,
        } => commands::cluster::start(
            load_settings(&cli, Some(cluster), None)?,
            installation_id,
        ),
        Commands::Stop {
            installation_id,
            cluster,
        } => commands::cluster::stop(
            load_settings(&cli, Some(cluster), None)?,
            installation_id,
        ),
        Commands::Up { cluster } => commands::cluster::up(load_settings(&cli, Some(cluster), None)?),
        Commands::Configure { tracks } => {
            commands::configure::execute(load_settings(&cli, None, Some(tracks))?)
        }
        Commands::ListTracks { tracks } => {
            commands::list_tracks::execute(load_settings(&cli, None, Some(tracks))?)
        }
        Commands::Race(args) => {
            commands::race::execute(load_settings(&cli, None, Some(&args.tracks))?, args)
        }
        Commands::DeleteConfig => commands::configure::delete(load_settings(&cli, None, None)?),
    }
}
