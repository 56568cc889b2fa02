// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Harness settings with strict validation.
//!
//! Settings come from an optional YAML file layered over built-in defaults.
//! The rally home directory is resolved explicitly, never read implicitly
//! by the controllers:
//!
//! 1. the directory passed by the caller,
//! 2. the `RALLY_HOME` environment variable,
//! 3. the `HOME` environment variable,
//! 4. the current directory.
//!
//! The rally config directory is `<home>/.rally`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cluster::{ClusterOptions, DEFAULT_CAR, DEFAULT_HTTP_PORT, DEFAULT_NODE_NAME};
use crate::error::{HarnessError, HarnessResult, HardValidationError};
use crate::rally::{RaceConfig, DEFAULT_CONFIG_NAME};
use crate::types::{DistributionSpec, Port};

/// Environment variable overriding the rally home directory.
pub const RALLY_HOME_ENV: &str = "RALLY_HOME";

/// Directory below the home directory holding rally configuration.
pub const RALLY_DIR_NAME: &str = ".rally";

/// Resolve the rally home directory from the process environment.
pub fn resolve_home(explicit: Option<PathBuf>) -> PathBuf {
    resolve_home_from(
        explicit,
        std::env::var_os(RALLY_HOME_ENV),
        std::env::var_os("HOME"),
    )
}

/// Resolve the rally home directory from explicit inputs.
pub fn resolve_home_from(
    explicit: Option<PathBuf>,
    rally_home: Option<OsString>,
    home: Option<OsString>,
) -> PathBuf {
    explicit
        .or_else(|| rally_home.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(|| home.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Rally config directory below a home directory.
pub fn config_dir_for(home: &Path) -> PathBuf {
    home.join(RALLY_DIR_NAME)
}

/// Raw rally settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRallySettings {
    #[serde(default)]
    home: Option<PathBuf>,
    #[serde(default = "default_config_name")]
    config_name: String,
    #[serde(default)]
    track_repository: Option<String>,
    #[serde(default)]
    track_revision: Option<String>,
}

fn default_config_name() -> String {
    DEFAULT_CONFIG_NAME.to_string()
}

impl Default for RawRallySettings {
    fn default() -> Self {
        Self {
            home: None,
            config_name: default_config_name(),
            track_repository: None,
            track_revision: None,
        }
    }
}

/// Raw cluster settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClusterSettings {
    #[serde(default)]
    distribution_version: Option<String>,
    #[serde(default)]
    revision: Option<String>,
    #[serde(default = "default_http_port")]
    http_port: u16,
    #[serde(default = "default_node_name")]
    node_name: String,
    #[serde(default = "default_car")]
    car: String,
    #[serde(default = "default_port_timeout_secs")]
    port_timeout_secs: u64,
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_node_name() -> String {
    DEFAULT_NODE_NAME.to_string()
}

fn default_car() -> String {
    DEFAULT_CAR.to_string()
}

fn default_port_timeout_secs() -> u64 {
    120
}

impl Default for RawClusterSettings {
    fn default() -> Self {
        Self {
            distribution_version: None,
            revision: None,
            http_port: default_http_port(),
            node_name: default_node_name(),
            car: default_car(),
            port_timeout_secs: default_port_timeout_secs(),
        }
    }
}

/// Raw root settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    rally: RawRallySettings,
    #[serde(default)]
    cluster: RawClusterSettings,
}

/// Complete validated settings.
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub home: PathBuf,
    pub debug: bool,
    pub race: RaceConfig,
    pub cluster: ClusterOptions,
}

impl HarnessSettings {
    /// Built-in defaults for the given home directory override.
    pub fn defaults(home: Option<PathBuf>) -> HarnessResult<Self> {
        Self::validate(RawSettings::default(), home)
    }

    /// Load and validate settings from a YAML file.
    pub fn load_file(path: impl AsRef<Path>, home: Option<PathBuf>) -> HarnessResult<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::Io {
            context: "reading settings file",
            source: e,
        })?;

        Self::load_string(&content, home)
    }

    /// Load and validate settings from a YAML string.
    pub fn load_string(content: &str, home: Option<PathBuf>) -> HarnessResult<Self> {
        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| HarnessError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw, home)
    }

    /// Force debug mode on both controllers.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug |= debug;
        self.race.debug = self.debug;
        self.cluster.debug = self.debug;
        self
    }

    fn validate(raw: RawSettings, home: Option<PathBuf>) -> HarnessResult<Self> {
        let home = resolve_home(home.or(raw.rally.home));

        let config_name = raw.rally.config_name;
        if config_name.is_empty() || config_name.contains(['/', '\\']) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "config_name",
                value: config_name,
                reason: "Must be a non-empty file name component".to_string(),
            }
            .into());
        }

        let http_port = Port::new(raw.cluster.http_port)?;
        // Fail here rather than at controller construction.
        http_port.transport()?;

        if raw.cluster.port_timeout_secs == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "port_timeout_secs",
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            }
            .into());
        }

        if raw.cluster.node_name.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "node_name",
                value: String::new(),
                reason: "Node name cannot be empty".to_string(),
            }
            .into());
        }

        let race = RaceConfig {
            track_repository: raw.rally.track_repository,
            track_revision: raw.rally.track_revision,
            config_dir: config_dir_for(&home),
            config_name,
            debug: raw.debug,
        };

        let cluster = ClusterOptions {
            distribution: DistributionSpec::from_options(
                raw.cluster.distribution_version,
                raw.cluster.revision,
            ),
            http_port,
            node_name: raw.cluster.node_name,
            car: raw.cluster.car,
            debug: raw.debug,
            port_timeout: Duration::from_secs(raw.cluster.port_timeout_secs),
        };

        Ok(Self {
            home,
            debug: raw.debug,
            race,
            cluster,
        })
    }
}
