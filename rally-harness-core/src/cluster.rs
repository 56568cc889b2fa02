// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Single-node Elasticsearch cluster provisioned through `esrally`.
//!
//! Owns the install → start → stop lifecycle and the installation id that
//! ties the three calls together. In debug mode every call only logs the
//! command it would have run.

use std::fmt;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::{HarnessError, HarnessResult, ProcessError};
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::state::{ClusterState, ClusterStateMachine};
use crate::types::{DistributionSpec, InstallationId, Port, RaceId};

/// Default HTTP port of the test cluster.
pub const DEFAULT_HTTP_PORT: u16 = 19200;

/// Default node name.
pub const DEFAULT_NODE_NAME: &str = "rally-node";

/// Default car (node configuration) passed to `esrally install`.
pub const DEFAULT_CAR: &str = "4gheap,trial-license,x-pack-ml,lean-watermarks";

/// Default time to wait for the HTTP port to become free.
pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(120);

/// Interval between port probes.
const PORT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connect timeout for a single port probe.
const PORT_PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// Options for a [`ClusterController`].
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub distribution: DistributionSpec,
    pub http_port: Port,
    pub node_name: String,
    pub car: String,
    pub debug: bool,
    pub port_timeout: Duration,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            distribution: DistributionSpec::default(),
            http_port: Port::new_unchecked(DEFAULT_HTTP_PORT),
            node_name: DEFAULT_NODE_NAME.to_string(),
            car: DEFAULT_CAR.to_string(),
            debug: false,
            port_timeout: DEFAULT_PORT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstallOutput {
    #[serde(rename = "installation-id")]
    installation_id: String,
}

/// Lifecycle controller for one `esrally`-provisioned node.
#[derive(Debug)]
pub struct ClusterController<R = SystemProcessRunner> {
    options: ClusterOptions,
    transport_port: Port,
    installation_id: Option<InstallationId>,
    state: ClusterStateMachine,
    runner: R,
}

impl ClusterController<SystemProcessRunner> {
    /// Create a controller that spawns real `esrally` processes.
    pub fn new(options: ClusterOptions) -> HarnessResult<Self> {
        Self::with_runner(options, SystemProcessRunner)
    }
}

impl<R: ProcessRunner> ClusterController<R> {
    /// Create a controller executing commands through `runner`.
    pub fn with_runner(options: ClusterOptions, runner: R) -> HarnessResult<Self> {
        let transport_port = options.http_port.transport()?;
        let state = ClusterStateMachine::new(options.http_port);

        Ok(Self {
            options,
            transport_port,
            installation_id: None,
            state,
            runner,
        })
    }

    pub fn installation_id(&self) -> Option<&InstallationId> {
        self.installation_id.as_ref()
    }

    pub fn http_port(&self) -> Port {
        self.options.http_port
    }

    pub fn transport_port(&self) -> Port {
        self.transport_port
    }

    pub fn state(&self) -> ClusterState {
        self.state.state()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Adopt an installation created elsewhere, e.g. by an earlier process.
    pub fn attach(&mut self, installation_id: InstallationId) -> HarnessResult<()> {
        self.state.transition_to(ClusterState::Installed)?;
        self.installation_id = Some(installation_id);
        Ok(())
    }

    /// The `esrally install` command line for this node.
    pub fn install_command(&self) -> String {
        let node = &self.options.node_name;
        format!(
            "esrally install --quiet --http-port={} --node={} --master-nodes={} --car={} \
             --seed-hosts=\"127.0.0.1:{}\" {}",
            self.options.http_port,
            node,
            node,
            self.options.car,
            self.transport_port,
            self.options.distribution.install_option()
        )
    }

    fn installation_id_arg(&self) -> &str {
        self.installation_id
            .as_ref()
            .map_or("None", InstallationId::as_str)
    }

    /// Block until nothing accepts connections on the HTTP port.
    ///
    /// Polls every 500ms. Only a refused connection counts as free.
    pub fn wait_until_port_is_free(&self) -> HarnessResult<()> {
        let port = self.options.http_port;
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port.value()));
        let deadline = Instant::now() + self.options.port_timeout;

        loop {
            match TcpStream::connect_timeout(&addr, PORT_PROBE_TIMEOUT) {
                Err(e) if e.kind() == ErrorKind::ConnectionRefused => return Ok(()),
                _ => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(HarnessError::PortTimeout {
                    port,
                    timeout_secs: self.options.port_timeout.as_secs(),
                });
            }

            tracing::debug!(port = %port, "Port still occupied, waiting");
            std::thread::sleep(PORT_POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Provision the node and remember its installation id.
    pub fn install(&mut self) -> HarnessResult<()> {
        self.state.check(ClusterState::Installed)?;
        let cmd = self.install_command();
        tracing::debug!(command = %cmd, "Installing Elasticsearch");

        if self.options.debug {
            self.state.transition_to(ClusterState::Installed)?;
            return Ok(());
        }

        self.wait_until_port_is_free()?;
        tracing::info!(command = %cmd, "Installing Elasticsearch");

        let output = self
            .runner
            .run_with_output(&cmd)
            .map_err(|source| HarnessError::Installation {
                command: cmd.clone(),
                source,
            })?;

        let installation_id =
            parse_installation_id(&cmd, &output).map_err(|source| HarnessError::Installation {
                command: cmd.clone(),
                source,
            })?;

        tracing::info!(installation_id = %installation_id, "Elasticsearch installed");
        self.installation_id = Some(installation_id);
        self.state.transition_to(ClusterState::Installed)?;
        Ok(())
    }

    /// Start the installed node under a fresh race id.
    pub fn start(&mut self) -> HarnessResult<RaceId> {
        self.state.check(ClusterState::Running)?;
        let race_id = RaceId::generate();
        let cmd = format!(
            "esrally start --runtime-jdk=bundled --installation-id={} --race-id={}",
            self.installation_id_arg(),
            race_id
        );
        tracing::info!(command = %cmd, "Starting Elasticsearch");

        if !self.options.debug {
            run_checked(&self.runner, &cmd).map_err(|source| HarnessError::Start {
                command: cmd.clone(),
                source,
            })?;
        }

        self.state.transition_to(ClusterState::Running)?;
        Ok(race_id)
    }

    /// Stop the node.
    pub fn stop(&mut self) -> HarnessResult<()> {
        self.state.check(ClusterState::Stopped)?;
        let cmd = format!("esrally stop --installation-id={}", self.installation_id_arg());
        tracing::info!(command = %cmd, "Stopping Elasticsearch");

        if !self.options.debug {
            run_checked(&self.runner, &cmd).map_err(|source| HarnessError::Stop {
                command: cmd.clone(),
                source,
            })?;
        }

        self.state.transition_to(ClusterState::Stopped)?;
        Ok(())
    }
}

impl<R> fmt::Display for ClusterController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.installation_id {
            Some(id) => write!(f, "TestCluster[installation-id={}]", id),
            None => write!(f, "TestCluster[installation-id=None]"),
        }
    }
}

fn run_checked<R: ProcessRunner>(runner: &R, cmd: &str) -> Result<(), ProcessError> {
    match runner.run_with_return_code(cmd)? {
        0 => Ok(()),
        code => Err(ProcessError::NonZeroExit {
            command: cmd.to_string(),
            code,
            output: String::new(),
        }),
    }
}

/// Extract `installation-id` from the JSON printed by `esrally install`.
pub fn parse_installation_id(
    cmd: &str,
    output: &[String],
) -> Result<InstallationId, ProcessError> {
    let joined = output.concat();
    let parsed: InstallOutput =
        serde_json::from_str(&joined).map_err(|e| ProcessError::InvalidOutput {
            command: cmd.to_string(),
            reason: format!("expected JSON with an installation-id: {}", e),
        })?;

    InstallationId::new(parsed.installation_id).map_err(|e| ProcessError::InvalidOutput {
        command: cmd.to_string(),
        reason: e.to_string(),
    })
}
