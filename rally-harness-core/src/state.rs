// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Cluster state machine with typed state transitions.
//!
//! Implements the cluster lifecycle: Uninstalled → Installed → Running → Stopped.
//! Invalid transitions result in StateTransitionError.

use serde::{Deserialize, Serialize};

use crate::error::StateTransitionError;
use crate::types::Port;

/// Cluster lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterState {
    /// Nothing provisioned yet.
    Uninstalled,

    /// `esrally install` returned an installation id.
    Installed,

    /// `esrally start` succeeded for the installation.
    Running,

    /// `esrally stop` was issued for the installation.
    Stopped,
}

impl ClusterState {
    /// Get the state name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Uninstalled => "Uninstalled",
            Self::Installed => "Installed",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }

    /// Check if transition to the target state is valid.
    pub fn can_transition_to(&self, target: ClusterState) -> bool {
        matches!(
            (self, target),
            (Self::Uninstalled, Self::Installed) |
            // An installed node may be stopped before it ever started
            (Self::Installed, Self::Running) |
            (Self::Installed, Self::Stopped) |
            (Self::Running, Self::Stopped) |
            // Restart of the same installation
            (Self::Stopped, Self::Running)
        )
    }
}

impl std::fmt::Display for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// State machine for a cluster's lifecycle.
#[derive(Debug)]
pub struct ClusterStateMachine {
    port: Port,
    current_state: ClusterState,
    transition_count: u64,
}

impl ClusterStateMachine {
    /// Create a new state machine for the cluster listening on `port`.
    pub fn new(port: Port) -> Self {
        Self {
            port,
            current_state: ClusterState::Uninstalled,
            transition_count: 0,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> ClusterState {
        self.current_state
    }

    /// Get total number of transitions.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Fail unless a transition to `target` would be accepted.
    pub fn check(&self, target: ClusterState) -> Result<(), StateTransitionError> {
        if !self.current_state.can_transition_to(target) {
            return Err(StateTransitionError::InvalidTransition {
                port: self.port,
                from: self.current_state.name(),
                to: target.name(),
            });
        }
        Ok(())
    }

    /// Attempt to transition to a new state.
    pub fn transition_to(&mut self, target: ClusterState) -> Result<(), StateTransitionError> {
        self.check(target)?;

        tracing::debug!(
            port = %self.port,
            from = self.current_state.name(),
            to = target.name(),
            "Cluster state transition"
        );

        self.current_state = target;
        self.transition_count += 1;

        Ok(())
    }
}
