//! rally-harness Core Library
//!
//! Drives the external `esrally` benchmarking tool from a test run.
//! Provides command-line construction, subprocess execution, the cluster
//! install/start/stop state machine, rally config file rendering, and race
//! execution.

pub mod cluster;
pub mod command;
pub mod error;
pub mod process;
pub mod rally;
pub mod settings;
pub mod state;
pub mod template;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tracks;
pub mod types;

// Re-export commonly used types
pub use cluster::{ClusterController, ClusterOptions};
pub use command::{CommandInvocation, OptionValue};
pub use error::{HarnessError, HarnessResult, ProcessError};
pub use process::{ProcessRunner, SystemProcessRunner};
pub use rally::{ListTracksOptions, RaceConfig, RaceController, RaceOptions};
pub use settings::HarnessSettings;
pub use state::ClusterState;
#[cfg(any(test, feature = "testing"))]
pub use testing::{ScriptedReply, ScriptedRunner};
pub use tracks::TrackInfo;
pub use types::{DistributionSpec, InstallationId, Port, RaceId};
