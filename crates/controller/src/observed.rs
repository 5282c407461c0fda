//! Last observed phase and health per application.
//!
//! The kube-rs controller hands reconcile only the current object, so the
//! previous half of each (old, new) pair is kept here. Only the two status
//! values are stored, never the object itself.

use dashmap::DashMap;
use kube::runtime::reflector::ObjectRef;
use notify::ObservedState;

use crate::crds::Application;

pub type ApplicationKey = ObjectRef<Application>;

#[derive(Default)]
pub struct ObservedStates {
    states: DashMap<ApplicationKey, ObservedState>,
}

impl ObservedStates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and return what was observed before, if anything.
    pub fn observe(&self, key: ApplicationKey, current: ObservedState) -> Option<ObservedState> {
        self.states.insert(key, current)
    }

    pub fn forget(&self, key: &ApplicationKey) {
        self.states.remove(key);
    }

    /// Drop entries whose key fails `live`.
    pub fn retain(&self, live: impl Fn(&ApplicationKey) -> bool) -> usize {
        let before = self.states.len();
        self.states.retain(|key, _| live(key));
        before.saturating_sub(self.states.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::{HealthStatus, Phase};

    fn key(name: &str) -> ApplicationKey {
        ObjectRef::new(name).within("argocd")
    }

    fn state(phase: Phase) -> ObservedState {
        ObservedState {
            phase,
            health: HealthStatus::None,
        }
    }

    #[test]
    fn test_first_observation_has_no_previous() {
        let store = ObservedStates::new();
        assert!(store.observe(key("a"), state(Phase::Running)).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_observe_returns_previous() {
        let store = ObservedStates::new();
        store.observe(key("a"), state(Phase::Running));
        let previous = store.observe(key("a"), state(Phase::Succeeded));
        assert_eq!(previous, Some(state(Phase::Running)));
        assert_eq!(
            store.observe(key("a"), state(Phase::Succeeded)),
            Some(state(Phase::Succeeded))
        );
    }

    #[test]
    fn test_keys_are_namespaced() {
        let store = ObservedStates::new();
        store.observe(key("a"), state(Phase::Running));
        let other = ObjectRef::new("a").within("other");
        assert!(store.observe(other, state(Phase::Failed)).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_forget_and_retain() {
        let store = ObservedStates::new();
        store.observe(key("a"), state(Phase::Running));
        store.observe(key("b"), state(Phase::Running));
        store.observe(key("c"), state(Phase::Running));

        store.forget(&key("a"));
        assert_eq!(store.len(), 2);

        let pruned = store.retain(|k| k.name == "b");
        assert_eq!(pruned, 1);
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }
}
