// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! All types validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HardValidationError;

/// Offset between a node's HTTP port and its transport port.
pub const TRANSPORT_PORT_OFFSET: u16 = 100;

/// Validated network port.
/// Must be in range 1-65535 (0 is reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Create a new Port with validation.
    pub fn new(port: u16) -> Result<Self, HardValidationError> {
        if port == 0 {
            return Err(HardValidationError::InvalidPort {
                port,
                reason: "Port 0 is reserved and cannot be used".to_string(),
            });
        }
        Ok(Self(port))
    }

    /// Create without validation. Caller must pass a non-zero port.
    pub const fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Get the inner port value.
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Transport port paired with this HTTP port.
    pub fn transport(&self) -> Result<Self, HardValidationError> {
        self.0
            .checked_add(TRANSPORT_PORT_OFFSET)
            .map(Self)
            .ok_or_else(|| HardValidationError::InvalidPort {
                port: self.0,
                reason: format!(
                    "HTTP port leaves no room for transport port (+{})",
                    TRANSPORT_PORT_OFFSET
                ),
            })
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = HardValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Opaque identifier returned by `esrally install`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstallationId(String);

impl InstallationId {
    /// Create a new InstallationId. Must be non-empty and free of whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, HardValidationError> {
        let id = id.into();

        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "installation_id",
                value: id,
                reason: "Installation ID must be non-empty and contain no whitespace"
                    .to_string(),
            });
        }

        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for InstallationId {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstallationId> for String {
    fn from(id: InstallationId) -> Self {
        id.0
    }
}

/// Unique identifier for a single `esrally start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RaceId(Uuid);

impl RaceId {
    /// Generate a fresh random race id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which Elasticsearch build to install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionSpec {
    /// A released distribution, e.g. `8.11.0`.
    Version(String),
    /// A source revision, e.g. `current` or a commit hash.
    Revision(String),
}

impl DistributionSpec {
    /// Pick the distribution version when given, else the revision.
    pub fn from_options(version: Option<String>, revision: Option<String>) -> Self {
        match version {
            Some(v) => Self::Version(v),
            None => Self::Revision(revision.unwrap_or_else(|| "current".to_string())),
        }
    }

    /// The `esrally install` option selecting this distribution.
    pub fn install_option(&self) -> String {
        match self {
            Self::Version(v) => format!("--distribution-version={}", v),
            Self::Revision(r) => format!("--revision={}", r),
        }
    }
}

impl Default for DistributionSpec {
    fn default() -> Self {
        Self::Revision("current".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_valid() {
        assert!(Port::new(19200).is_ok());
        assert!(Port::new(1).is_ok());
        assert!(Port::new(65535).is_ok());
    }

    #[test]
    fn test_port_invalid() {
        assert!(Port::new(0).is_err());
    }

    #[test]
    fn test_transport_port() {
        let port = Port::new(19200).unwrap();
        assert_eq!(port.transport().unwrap().value(), 19300);
        assert!(Port::new(65500).unwrap().transport().is_err());
    }

    #[test]
    fn test_installation_id() {
        assert!(InstallationId::new("abc123").is_ok());
        assert!(InstallationId::new("").is_err());
        assert!(InstallationId::new("abc 123").is_err());
    }

    #[test]
    fn test_race_ids_are_unique() {
        assert_ne!(RaceId::generate(), RaceId::generate());
    }

    #[test]
    fn test_distribution_spec() {
        let version = DistributionSpec::from_options(Some("8.11.0".into()), Some("abc".into()));
        assert_eq!(version.install_option(), "--distribution-version=8.11.0");

        let revision = DistributionSpec::from_options(None, None);
        assert_eq!(revision, DistributionSpec::default());
        assert_eq!(revision.install_option(), "--revision=current");
    }
}
