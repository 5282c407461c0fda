//! Maps a transition event to the payload of a notification channel.
//!
//! Every function here is pure: the same event always yields the same
//! payload.

use crate::events::{
    Channel, CheckRun, CheckRunStatus, Comment, Conclusion, Notification, TransitionEvent,
};
use crate::snapshot::{HealthStatus, Phase};

/// Status, conclusion and title shared by all channels.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Verdict {
    status: CheckRunStatus,
    conclusion: Option<Conclusion>,
    title: String,
}

impl Verdict {
    fn in_progress(title: String) -> Self {
        Self {
            status: CheckRunStatus::InProgress,
            conclusion: None,
            title,
        }
    }

    fn completed(conclusion: Conclusion, title: String) -> Self {
        Self {
            status: CheckRunStatus::Completed,
            conclusion: Some(conclusion),
            title,
        }
    }
}

/// Generate the payload for `channel`, if the event warrants one.
#[must_use]
pub fn generate(event: &TransitionEvent, channel: Channel) -> Option<Notification> {
    match channel {
        Channel::CheckRun => generate_check_run(event).map(Notification::CheckRun),
        Channel::Comment => generate_comment(event).map(Notification::Comment),
    }
}

/// Generate the check run update for an event.
#[must_use]
pub fn generate_check_run(event: &TransitionEvent) -> Option<CheckRun> {
    let verdict = verdict(event)?;
    Some(CheckRun {
        status: verdict.status,
        conclusion: verdict.conclusion,
        title: verdict.title,
        summary: summary(event),
    })
}

/// Generate the pull request comment for an event.
#[must_use]
pub fn generate_comment(event: &TransitionEvent) -> Option<Comment> {
    let verdict = verdict(event)?;
    let revision = &event.application.last_sync_revision;
    let revision_line = if revision.is_empty() {
        String::new()
    } else {
        format!("Revision: {revision}\n")
    };
    Some(Comment {
        body: format!("## {}\n{revision_line}{}", verdict.title, summary(event)),
    })
}

/// Phase takes priority: the health branch is only reached when a present
/// phase produced nothing. A flagged but missing phase yields no payload.
fn verdict(event: &TransitionEvent) -> Option<Verdict> {
    if event.phase_changed {
        if event.application.phase.is_none() {
            return None;
        }
        if let Some(verdict) = phase_verdict(event) {
            return Some(verdict);
        }
    }
    if event.health_changed {
        return health_verdict(event);
    }
    None
}

fn phase_verdict(event: &TransitionEvent) -> Option<Verdict> {
    let app = &event.application;
    let message = &app.operation_message;
    match app.phase {
        Phase::Running => Some(Verdict::in_progress(format!("Syncing: {message}"))),
        Phase::Succeeded => Some(Verdict::completed(
            Conclusion::Success,
            format!("Synced: {message}"),
        )),
        Phase::Failed => Some(Verdict::completed(
            Conclusion::Failure,
            format!("Sync Failed: {message}"),
        )),
        Phase::Error => Some(Verdict::completed(
            Conclusion::Failure,
            format!("Sync Error: {message}"),
        )),
        Phase::None | Phase::Unknown | Phase::Terminating | Phase::Other(_) => None,
    }
}

fn health_verdict(event: &TransitionEvent) -> Option<Verdict> {
    let app = &event.application;
    let message = &app.health_message;
    match app.health_status {
        HealthStatus::Progressing => {
            Some(Verdict::in_progress(format!("Progressing: {message}")))
        }
        HealthStatus::Healthy => Some(Verdict::completed(
            Conclusion::Success,
            format!("Healthy: {message}"),
        )),
        HealthStatus::Degraded => Some(Verdict::completed(
            Conclusion::Failure,
            format!("Degraded: {message}"),
        )),
        HealthStatus::None
        | HealthStatus::Unknown
        | HealthStatus::Suspended
        | HealthStatus::Missing
        | HealthStatus::Other(_) => None,
    }
}

fn summary(event: &TransitionEvent) -> String {
    let application_url = event.application_url();
    let external_urls = event.application.external_urls.join("\n");
    format!(
        "
## Argo CD
{application_url}

## External URL
{external_urls}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ApplicationSnapshot;

    fn event(
        phase: &str,
        health: &str,
        phase_changed: bool,
        health_changed: bool,
    ) -> TransitionEvent {
        TransitionEvent {
            application: ApplicationSnapshot {
                name: "guestbook".to_string(),
                namespace: "argocd".to_string(),
                phase: Phase::parse(phase),
                operation_message: "deploying v2".to_string(),
                health_status: HealthStatus::parse(health),
                health_message: "all pods ready".to_string(),
                last_sync_revision: "0123abc".to_string(),
                external_urls: vec![
                    "https://guestbook.example.com".to_string(),
                    "https://admin.guestbook.example.com".to_string(),
                ],
                ..Default::default()
            },
            argocd_url: "https://argocd.example.com".to_string(),
            phase_changed,
            health_changed,
        }
    }

    #[test]
    fn test_phase_mapping() {
        let cases = [
            ("Running", CheckRunStatus::InProgress, None, "Syncing: deploying v2"),
            (
                "Succeeded",
                CheckRunStatus::Completed,
                Some(Conclusion::Success),
                "Synced: deploying v2",
            ),
            (
                "Failed",
                CheckRunStatus::Completed,
                Some(Conclusion::Failure),
                "Sync Failed: deploying v2",
            ),
            (
                "Error",
                CheckRunStatus::Completed,
                Some(Conclusion::Failure),
                "Sync Error: deploying v2",
            ),
        ];

        for (phase, status, conclusion, title) in cases {
            let cr = generate_check_run(&event(phase, "", true, false)).unwrap();
            assert_eq!(cr.status, status, "{phase}");
            assert_eq!(cr.conclusion, conclusion, "{phase}");
            assert_eq!(cr.title, title);
        }
    }

    #[test]
    fn test_health_mapping() {
        let cases = [
            ("Progressing", CheckRunStatus::InProgress, None, "Progressing: all pods ready"),
            (
                "Healthy",
                CheckRunStatus::Completed,
                Some(Conclusion::Success),
                "Healthy: all pods ready",
            ),
            (
                "Degraded",
                CheckRunStatus::Completed,
                Some(Conclusion::Failure),
                "Degraded: all pods ready",
            ),
        ];

        for (health, status, conclusion, title) in cases {
            let cr = generate_check_run(&event("", health, false, true)).unwrap();
            assert_eq!(cr.status, status, "{health}");
            assert_eq!(cr.conclusion, conclusion, "{health}");
            assert_eq!(cr.title, title);
        }
    }

    #[test]
    fn test_no_flags_no_payload() {
        assert!(generate_check_run(&event("Running", "Healthy", false, false)).is_none());
        assert!(generate_comment(&event("Running", "Healthy", false, false)).is_none());
    }

    #[test]
    fn test_unmapped_values_give_none() {
        assert!(generate_check_run(&event("Terminating", "", true, false)).is_none());
        assert!(generate_check_run(&event("Unknown", "", true, false)).is_none());
        assert!(generate_check_run(&event("", "", true, false)).is_none());
        assert!(generate_check_run(&event("", "Suspended", false, true)).is_none());
        assert!(generate_check_run(&event("", "Missing", false, true)).is_none());
    }

    #[test]
    fn test_phase_takes_priority_over_health() {
        let cr = generate_check_run(&event("Succeeded", "Degraded", true, true)).unwrap();
        assert_eq!(cr.title, "Synced: deploying v2");
    }

    #[test]
    fn test_unmapped_phase_falls_through_to_health() {
        let cr = generate_check_run(&event("Terminating", "Degraded", true, true)).unwrap();
        assert_eq!(cr.title, "Degraded: all pods ready");
        assert_eq!(cr.conclusion, Some(Conclusion::Failure));
    }

    #[test]
    fn test_missing_phase_never_falls_through_to_health() {
        assert_eq!(generate_check_run(&event("", "Healthy", true, true)), None);
        assert_eq!(generate_comment(&event("", "Degraded", true, true)), None);
    }

    #[test]
    fn test_summary_contents() {
        let cr = generate_check_run(&event("Running", "", true, false)).unwrap();
        assert_eq!(
            cr.summary,
            "\n## Argo CD\nhttps://argocd.example.com/applications/guestbook\n\n## External URL\nhttps://guestbook.example.com\nhttps://admin.guestbook.example.com\n"
        );
    }

    #[test]
    fn test_summary_with_unresolved_argocd_url() {
        let mut e = event("Running", "", true, false);
        e.argocd_url = String::new();
        e.application.external_urls.clear();
        let cr = generate_check_run(&e).unwrap();
        assert_eq!(
            cr.summary,
            "\n## Argo CD\n/applications/guestbook\n\n## External URL\n\n"
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let e = event("Failed", "Degraded", true, true);
        assert_eq!(generate(&e, Channel::CheckRun), generate(&e, Channel::CheckRun));
        assert_eq!(generate(&e, Channel::Comment), generate(&e, Channel::Comment));
    }

    #[test]
    fn test_comment_body() {
        let comment = generate_comment(&event("Succeeded", "", true, false)).unwrap();
        assert!(comment.body.starts_with("## Synced: deploying v2\nRevision: 0123abc\n"));
        assert!(comment
            .body
            .contains("https://argocd.example.com/applications/guestbook"));
    }

    #[test]
    fn test_comment_without_revision() {
        let mut e = event("Running", "", true, false);
        e.application.last_sync_revision = String::new();
        let comment = generate_comment(&e).unwrap();
        assert!(comment.body.starts_with("## Syncing: deploying v2\n\n## Argo CD\n"));
    }

    #[test]
    fn test_generate_tags_channel() {
        let e = event("Running", "", true, false);
        assert_eq!(
            generate(&e, Channel::CheckRun).map(|n| n.channel()),
            Some(Channel::CheckRun)
        );
        assert_eq!(
            generate(&e, Channel::Comment).map(|n| n.channel()),
            Some(Channel::Comment)
        );
    }
}
