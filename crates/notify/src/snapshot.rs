//! Comparable projection of an Argo CD `Application`.

use std::collections::BTreeMap;
use std::fmt;

/// Sync operation phase of an application.
///
/// `None` means the application has no operation state recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    None,
    Unknown,
    Running,
    Succeeded,
    Failed,
    Error,
    Terminating,
    /// A phase string this crate does not know about.
    Other(String),
}

impl Phase {
    /// Parse the phase string reported by Argo CD.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "" => Self::None,
            "Unknown" => Self::Unknown,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Error" => Self::Error,
            "Terminating" => Self::Terminating,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Unknown => "Unknown",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Error => "Error",
            Self::Terminating => "Terminating",
            Self::Other(value) => value,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Phases that trigger a notification when entered.
    #[must_use]
    pub const fn is_monitored(&self) -> bool {
        matches!(
            self,
            Self::Running | Self::Succeeded | Self::Failed | Self::Error
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health status of the deployed workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum HealthStatus {
    #[default]
    None,
    Unknown,
    Progressing,
    Healthy,
    Degraded,
    Suspended,
    Missing,
    Other(String),
}

impl HealthStatus {
    /// Parse the health status string reported by Argo CD.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "" => Self::None,
            "Unknown" => Self::Unknown,
            "Progressing" => Self::Progressing,
            "Healthy" => Self::Healthy,
            "Degraded" => Self::Degraded,
            "Suspended" => Self::Suspended,
            "Missing" => Self::Missing,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Unknown => "Unknown",
            Self::Progressing => "Progressing",
            Self::Healthy => "Healthy",
            Self::Degraded => "Degraded",
            Self::Suspended => "Suspended",
            Self::Missing => "Missing",
            Self::Other(value) => value,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Health statuses that trigger a notification when entered.
    #[must_use]
    pub const fn is_monitored(&self) -> bool {
        matches!(self, Self::Progressing | Self::Healthy | Self::Degraded)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only projection of an application at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationSnapshot {
    pub name: String,
    pub namespace: String,
    /// Deletion timestamp is set.
    pub deleting: bool,
    pub phase: Phase,
    pub operation_message: String,
    pub health_status: HealthStatus,
    pub health_message: String,
    /// Revision of the most recent sync operation, empty if none.
    pub last_sync_revision: String,
    pub external_urls: Vec<String>,
    pub annotations: BTreeMap<String, String>,
    /// Source repository URL (`spec.source.repoURL`).
    pub repo_url: String,
}

impl ApplicationSnapshot {
    /// The part of the snapshot that takes part in transition decisions.
    #[must_use]
    pub fn observed(&self) -> ObservedState {
        ObservedState {
            phase: self.phase.clone(),
            health: self.health_status.clone(),
        }
    }

    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// Last observed phase and health of an application.
///
/// This is all that needs to be remembered between two observations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ObservedState {
    pub phase: Phase,
    pub health: HealthStatus,
}
