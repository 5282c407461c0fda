//! Orchestrates predicate, generator, reference resolution and delivery.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::GitHubApi;
use crate::error::DispatchError;
use crate::events::{Channel, TransitionEvent};
use crate::generator::{generate_check_run, generate_comment};
use crate::predicate::Transition;
use crate::reference::{parse_check_run_url, parse_repository_url, CHECK_RUN_URL_ANNOTATION};
use crate::snapshot::{ApplicationSnapshot, ObservedState};

/// Why a dispatch ended without calling GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The application is being deleted
    Deleting,
    /// Neither phase nor health entered a monitored value
    NotNotable,
    /// No usable check run URL, repository or revision on the application
    MissingReference,
    /// The transition has no payload for this channel
    NoPayload,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deleting => "application is being deleted",
            Self::NotNotable => "transition is not notable",
            Self::MissingReference => "no notification target",
            Self::NoPayload => "nothing to notify for this transition",
        })
    }
}

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Delivered { channel: Channel, target: String },
}

impl Outcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Sends notifications for application transitions.
///
/// The dispatcher keeps no state between calls. It calls the client at most
/// once per channel and never retries.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn GitHubApi>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(client: Arc<dyn GitHubApi>) -> Self {
        Self { client }
    }

    /// Build the transition event for an update, or `None` if it is not notable.
    #[must_use]
    pub fn event(
        previous: &ObservedState,
        application: &ApplicationSnapshot,
        argocd_url: &str,
    ) -> Option<TransitionEvent> {
        if application.deleting {
            return None;
        }
        let transition = Transition::between(previous, &application.observed());
        if !transition.is_notable() {
            return None;
        }
        Some(TransitionEvent {
            application: application.clone(),
            argocd_url: argocd_url.to_string(),
            phase_changed: transition.phase_changed,
            health_changed: transition.health_changed,
        })
    }

    /// Deliver the notification for one channel.
    pub async fn dispatch(
        &self,
        previous: &ObservedState,
        application: &ApplicationSnapshot,
        argocd_url: &str,
        channel: Channel,
    ) -> Result<Outcome, DispatchError> {
        if application.deleting {
            return Ok(Outcome::Skipped(SkipReason::Deleting));
        }
        let Some(event) = Self::event(previous, application, argocd_url) else {
            return Ok(Outcome::Skipped(SkipReason::NotNotable));
        };
        self.deliver(&event, channel).await
    }

    /// Deliver an already built event to every channel, in order.
    pub async fn dispatch_all(
        &self,
        event: &TransitionEvent,
        channels: &[Channel],
    ) -> Vec<(Channel, Result<Outcome, DispatchError>)> {
        let mut results = Vec::with_capacity(channels.len());
        for channel in channels {
            results.push((*channel, self.deliver(event, *channel).await));
        }
        results
    }

    /// Deliver an already built event to one channel.
    pub async fn deliver(
        &self,
        event: &TransitionEvent,
        channel: Channel,
    ) -> Result<Outcome, DispatchError> {
        match channel {
            Channel::CheckRun => self.deliver_check_run(event).await,
            Channel::Comment => self.deliver_comment(event).await,
        }
    }

    async fn deliver_check_run(&self, event: &TransitionEvent) -> Result<Outcome, DispatchError> {
        let app = &event.application;
        let Some(url) = app.annotation(CHECK_RUN_URL_ANNOTATION) else {
            return Ok(Outcome::Skipped(SkipReason::MissingReference));
        };
        let Some(id) = parse_check_run_url(url) else {
            debug!(application = %app.name, url, "check run annotation is not a check run URL");
            return Ok(Outcome::Skipped(SkipReason::MissingReference));
        };
        let Some(check_run) = generate_check_run(event) else {
            debug!(application = %app.name, phase = %app.phase, health = %app.health_status, "nothing to update the check run");
            return Ok(Outcome::Skipped(SkipReason::NoPayload));
        };

        info!(application = %app.name, check_run = %url, title = %check_run.title, "updating the check run");
        let target = id.to_string();
        self.client
            .update_check_run(&id, &check_run)
            .await
            .map_err(|source| DispatchError::Downstream {
                channel: Channel::CheckRun,
                target: target.clone(),
                source,
            })?;

        Ok(Outcome::Delivered {
            channel: Channel::CheckRun,
            target,
        })
    }

    async fn deliver_comment(&self, event: &TransitionEvent) -> Result<Outcome, DispatchError> {
        let app = &event.application;
        let Some(repository) = parse_repository_url(&app.repo_url) else {
            debug!(application = %app.name, repo_url = %app.repo_url, "source is not a GitHub repository");
            return Ok(Outcome::Skipped(SkipReason::MissingReference));
        };
        if app.last_sync_revision.is_empty() {
            return Ok(Outcome::Skipped(SkipReason::MissingReference));
        }
        let Some(comment) = generate_comment(event) else {
            debug!(application = %app.name, phase = %app.phase, health = %app.health_status, "nothing to comment");
            return Ok(Outcome::Skipped(SkipReason::NoPayload));
        };

        let target = format!("{repository}@{}", app.last_sync_revision);
        info!(application = %app.name, target = %target, "commenting on pull requests");
        self.client
            .comment_on_revision(&repository, &app.last_sync_revision, &comment)
            .await
            .map_err(|source| DispatchError::Downstream {
                channel: Channel::Comment,
                target: target.clone(),
                source,
            })?;

        Ok(Outcome::Delivered {
            channel: Channel::Comment,
            target,
        })
    }
}
