//! Decides whether an observed update of an application is notable.

use crate::snapshot::{ApplicationSnapshot, HealthStatus, ObservedState, Phase};

/// Which axes changed between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub phase_changed: bool,
    pub health_changed: bool,
}

impl Transition {
    /// Compare two observations of the same application.
    #[must_use]
    pub fn between(old: &ObservedState, new: &ObservedState) -> Self {
        Self {
            phase_changed: phase_entered(&old.phase, &new.phase),
            health_changed: health_entered(&old.health, &new.health),
        }
    }

    #[must_use]
    pub const fn is_notable(&self) -> bool {
        self.phase_changed || self.health_changed
    }
}

/// Returns true if the update from `old` to `new` should be processed.
#[must_use]
pub fn should_process(old: &ApplicationSnapshot, new: &ApplicationSnapshot) -> bool {
    Transition::between(&old.observed(), &new.observed()).is_notable()
}

fn phase_entered(old: &Phase, new: &Phase) -> bool {
    if new.is_none() || old == new {
        return false;
    }
    new.is_monitored()
}

fn health_entered(old: &HealthStatus, new: &HealthStatus) -> bool {
    if new.is_none() || old == new {
        return false;
    }
    new.is_monitored()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [&str; 7] = [
        "",
        "Unknown",
        "Running",
        "Succeeded",
        "Failed",
        "Error",
        "Terminating",
    ];

    const ALL_HEALTH: [&str; 7] = [
        "",
        "Unknown",
        "Progressing",
        "Healthy",
        "Degraded",
        "Suspended",
        "Missing",
    ];

    fn observed(phase: &str, health: &str) -> ObservedState {
        ObservedState {
            phase: Phase::parse(phase),
            health: HealthStatus::parse(health),
        }
    }

    #[test]
    fn test_equal_phase_never_triggers() {
        for phase in ALL_PHASES {
            let t = Transition::between(&observed(phase, ""), &observed(phase, ""));
            assert!(!t.phase_changed, "phase {phase:?} should not trigger");
            assert!(!t.is_notable());
        }
    }

    #[test]
    fn test_empty_new_phase_never_triggers() {
        for old in ALL_PHASES {
            let t = Transition::between(&observed(old, ""), &observed("", ""));
            assert!(!t.phase_changed, "old phase {old:?} should not trigger");
        }
    }

    #[test]
    fn test_entering_monitored_phase_triggers() {
        for new in ["Running", "Succeeded", "Failed", "Error"] {
            for old in ALL_PHASES.iter().filter(|old| **old != new) {
                let t = Transition::between(&observed(old, ""), &observed(new, ""));
                assert!(t.phase_changed, "{old:?} -> {new:?} should trigger");
                assert!(t.is_notable());
            }
        }
    }

    #[test]
    fn test_entering_unmonitored_phase_is_ignored() {
        for new in ["Unknown", "Terminating", "Paused"] {
            let t = Transition::between(&observed("Running", ""), &observed(new, ""));
            assert!(!t.phase_changed, "{new:?} should not trigger");
        }
    }

    #[test]
    fn test_health_transitions() {
        for new in ALL_HEALTH {
            for old in ALL_HEALTH {
                let t = Transition::between(&observed("", old), &observed("", new));
                let expected =
                    old != new && matches!(new, "Progressing" | "Healthy" | "Degraded");
                assert_eq!(t.health_changed, expected, "{old:?} -> {new:?}");
                assert!(!t.phase_changed);
            }
        }
    }

    #[test]
    fn test_both_axes_can_change_together() {
        let t = Transition::between(
            &observed("Running", "Progressing"),
            &observed("Succeeded", "Healthy"),
        );
        assert!(t.phase_changed);
        assert!(t.health_changed);
    }

    #[test]
    fn test_should_process_uses_snapshots() {
        let old = ApplicationSnapshot::default();
        let new = ApplicationSnapshot {
            phase: Phase::Running,
            last_sync_revision: "abc".to_string(),
            ..Default::default()
        };
        assert!(should_process(&old, &new));
        assert!(!should_process(&new, &new));
    }
}
