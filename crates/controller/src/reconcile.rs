//! Application controller: observe, detect transitions, notify.

use futures::StreamExt;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::reflector::{ObjectRef, Store};
use kube::runtime::watcher::Config;
use kube::{Api, Client, ResourceExt};
use notify::{
    Channel, DispatchError, Dispatcher, GitHubApi, ObservedState, Outcome, Transition,
    TransitionEvent,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::argocd::{ArgoCdUrlResolver, ArgoCdUrlSource};
use crate::config::ControllerConfig;
use crate::crds::Application;
use crate::observed::ObservedStates;
use crate::recorder::{EventKind, EventSink, KubeEventSink, NotificationEvent};
use crate::types::{Error, Result};

/// Shared state of all reconcile calls
pub struct Context {
    pub dispatcher: Dispatcher,
    pub channels: Vec<Channel>,
    pub events: Arc<dyn EventSink>,
    pub argocd: Arc<dyn ArgoCdUrlSource>,
    pub observed: Arc<ObservedStates>,
}

/// Main entry point of the Application controller
#[instrument(skip_all, fields(namespace = config.namespace.as_deref().unwrap_or("*")))]
pub async fn run_controller(
    client: Client,
    config: Arc<ControllerConfig>,
    github: Arc<dyn GitHubApi>,
    ready: Arc<AtomicBool>,
) -> Result<()> {
    let channels = config.channels.enabled();
    if channels.is_empty() {
        return Err(Error::ConfigError(
            "no notification channel enabled".to_string(),
        ));
    }
    info!(?channels, "Starting Application controller");

    let applications: Api<Application> = match config.namespace.as_deref() {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    };

    let observed = Arc::new(ObservedStates::new());
    let context = Arc::new(Context {
        dispatcher: Dispatcher::new(github),
        channels,
        events: Arc::new(KubeEventSink::new(client.clone(), &config.reporter)),
        argocd: Arc::new(ArgoCdUrlResolver::new(client, &config.argocd)),
        observed: observed.clone(),
    });

    let controller = Controller::new(applications, Config::default().any_semantic());
    let prune_handle = tokio::spawn(prune_observed(
        observed,
        controller.store(),
        Duration::from_secs(config.prune_interval_seconds),
    ));

    ready.store(true, Ordering::SeqCst);

    controller
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|reconciliation_result| async move {
            match reconciliation_result {
                Ok((application, _action)) => {
                    debug!(application = %application, "Application reconciliation successful");
                }
                Err(reconciliation_err) => {
                    warn!(error = %reconciliation_err, "Application reconciliation error");
                }
            }
        })
        .await;

    ready.store(false, Ordering::SeqCst);
    prune_handle.abort();
    info!("Application controller shutting down");
    Ok(())
}

/// Reconcile one application: record its state and notify on a notable
/// transition.
///
/// Always returns `Ok(Action::await_change())`. Delivery failures end up as
/// warning events, not reconcile errors.
#[instrument(skip_all, fields(application = %application.name_any(), namespace = %application.namespace().unwrap_or_default()))]
pub async fn reconcile(application: Arc<Application>, ctx: Arc<Context>) -> Result<Action> {
    let key = ObjectRef::from_obj(application.as_ref());
    let snapshot = application.snapshot();

    if snapshot.deleting {
        debug!("Application is being deleted, skipping");
        ctx.observed.forget(&key);
        return Ok(Action::await_change());
    }

    let current = snapshot.observed();
    let Some(previous) = ctx.observed.observe(key, current.clone()) else {
        debug!(phase = %current.phase, health = %current.health, "First observation, recording state");
        return Ok(Action::await_change());
    };

    if !Transition::between(&previous, &current).is_notable() {
        return Ok(Action::await_change());
    }

    info!(
        phase = %format!("{} -> {}", previous.phase, current.phase),
        health = %format!("{} -> {}", previous.health, current.health),
        "Notable transition"
    );

    let argocd_url = ctx.argocd.resolve_or_empty(&snapshot.namespace).await;
    notify_transition(
        &application,
        &previous,
        &argocd_url,
        &ctx.dispatcher,
        &ctx.channels,
        ctx.events.as_ref(),
    )
    .await;

    Ok(Action::await_change())
}

fn error_policy(application: Arc<Application>, err: &Error, _ctx: Arc<Context>) -> Action {
    error!(
        error = ?err,
        application = %application.name_any(),
        "Application reconciliation failed, requeueing"
    );
    Action::requeue(Duration::from_secs(60))
}

/// Deliver the notifications for one transition and record one event per
/// delivery attempt.
///
/// Downstream failures are recorded as warning events and returned, never
/// retried here.
pub async fn notify_transition(
    application: &Application,
    previous: &ObservedState,
    argocd_url: &str,
    dispatcher: &Dispatcher,
    channels: &[Channel],
    events: &dyn EventSink,
) -> Vec<(Channel, std::result::Result<Outcome, DispatchError>)> {
    let snapshot = application.snapshot();
    let Some(event) = Dispatcher::event(previous, &snapshot, argocd_url) else {
        return Vec::new();
    };
    let trigger = trigger(&event);

    let results = dispatcher.dispatch_all(&event, channels).await;
    for (channel, result) in &results {
        match result {
            Ok(Outcome::Delivered { target, .. }) => {
                info!(%channel, %target, %trigger, "Notification delivered");
                events
                    .record(
                        application,
                        NotificationEvent {
                            kind: EventKind::Normal,
                            reason: success_reason(*channel).to_string(),
                            note: format!("{} by {trigger}", success_action(*channel)),
                        },
                    )
                    .await;
            }
            Ok(Outcome::Skipped(reason)) => {
                info!(%channel, %trigger, %reason, "No notification on this event");
            }
            Err(e) => {
                error!(%channel, %trigger, error = %e, "Notification failed");
                events
                    .record(
                        application,
                        NotificationEvent {
                            kind: EventKind::Warning,
                            reason: failure_reason(*channel).to_string(),
                            note: format!("unable to {} by {trigger}: {e}", failure_action(*channel)),
                        },
                    )
                    .await;
            }
        }
    }
    results
}

/// The status value that caused the event, for audit.
fn trigger(event: &TransitionEvent) -> String {
    if event.phase_changed {
        event.application.phase.to_string()
    } else {
        event.application.health_status.to_string()
    }
}

const fn success_reason(channel: Channel) -> &'static str {
    match channel {
        Channel::CheckRun => "UpdatedCheckRun",
        Channel::Comment => "CreatedComment",
    }
}

const fn failure_reason(channel: Channel) -> &'static str {
    match channel {
        Channel::CheckRun => "UpdateCheckRunError",
        Channel::Comment => "CreateCommentError",
    }
}

const fn success_action(channel: Channel) -> &'static str {
    match channel {
        Channel::CheckRun => "updated the check run",
        Channel::Comment => "created a comment",
    }
}

const fn failure_action(channel: Channel) -> &'static str {
    match channel {
        Channel::CheckRun => "update the check run",
        Channel::Comment => "create a comment",
    }
}

/// Periodically drop observed states of applications gone from the cache.
async fn prune_observed(observed: Arc<ObservedStates>, store: Store<Application>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let pruned = observed.retain(|key| store.get(key).is_some());
        if pruned > 0 {
            debug!(pruned, remaining = observed.len(), "Pruned observed application states");
        }
    }
}
