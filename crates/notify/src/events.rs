//! Transition events and the notification payloads derived from them.

use serde::Serialize;
use std::fmt;

use crate::snapshot::ApplicationSnapshot;

/// A notable transition of one application, built once per reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub application: ApplicationSnapshot,
    /// Base URL of the Argo CD UI, empty when it could not be resolved.
    pub argocd_url: String,
    pub phase_changed: bool,
    pub health_changed: bool,
}

impl TransitionEvent {
    /// URL of the application page in the Argo CD UI.
    #[must_use]
    pub fn application_url(&self) -> String {
        format!("{}/applications/{}", self.argocd_url, self.application.name)
    }
}

/// Downstream channel a notification is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    CheckRun,
    Comment,
}

impl Channel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CheckRun => "check-run",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check run status as understood by the GitHub API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    InProgress,
    Completed,
}

/// Check run conclusion, only set on completed runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Success,
    Failure,
}

/// Update applied to an existing check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
    pub status: CheckRunStatus,
    pub conclusion: Option<Conclusion>,
    pub title: String,
    pub summary: String,
}

/// Comment posted on the pull requests associated with the synced revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub body: String,
}

/// Payload produced for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    CheckRun(CheckRun),
    Comment(Comment),
}

impl Notification {
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::CheckRun(_) => Channel::CheckRun,
            Self::Comment(_) => Channel::Comment,
        }
    }
}
