//! Kubernetes events recorded on applications after each delivery attempt.

use async_trait::async_trait;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::{Client, Resource};
use tracing::warn;

use crate::crds::Application;

/// Severity of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Normal,
    Warning,
}

/// An observable record of a delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: EventKind,
    pub reason: String,
    pub note: String,
}

/// Destination for notification events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Record an event on the application. Failures are logged, not returned.
    async fn record(&self, application: &Application, event: NotificationEvent);
}

/// Publishes events through the Kubernetes events API
pub struct KubeEventSink {
    recorder: Recorder,
}

impl KubeEventSink {
    #[must_use]
    pub fn new(client: Client, controller: &str) -> Self {
        let reporter = Reporter {
            controller: controller.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventSink for KubeEventSink {
    async fn record(&self, application: &Application, event: NotificationEvent) {
        let reference = application.object_ref(&());
        let kube_event = Event {
            type_: match event.kind {
                EventKind::Normal => EventType::Normal,
                EventKind::Warning => EventType::Warning,
            },
            reason: event.reason.clone(),
            note: Some(event.note),
            action: "Notify".to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&kube_event, &reference).await {
            warn!(reason = %event.reason, error = %e, "unable to record event");
        }
    }
}
