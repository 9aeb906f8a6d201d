//! Service lifecycle state machine.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

/// Lifecycle of the bot service.
///
/// `Init → Connecting → Running ⇄ Degraded → ShuttingDown → Stopped`, with direct
/// `→ Stopped` edges for fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    Init,
    Connecting,
    Running,
    /// Connection lost; reconnecting with backoff.
    Degraded,
    ShuttingDown,
    Stopped,
}

impl ServiceState {
    pub fn can_transition_to(self, next: ServiceState) -> bool {
        use ServiceState::*;
        matches!(
            (self, next),
            (Init, Connecting)
                | (Init, Stopped)
                | (Connecting, Running)
                | (Connecting, ShuttingDown)
                | (Connecting, Stopped)
                | (Running, Degraded)
                | (Running, ShuttingDown)
                | (Running, Stopped)
                | (Degraded, Running)
                | (Degraded, ShuttingDown)
                | (Degraded, Stopped)
                | (ShuttingDown, Stopped)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == ServiceState::Stopped
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Init => "init",
            ServiceState::Connecting => "connecting",
            ServiceState::Running => "running",
            ServiceState::Degraded => "degraded",
            ServiceState::ShuttingDown => "shutting_down",
            ServiceState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Shared handle that applies valid transitions and publishes the current state.
#[derive(Clone)]
pub struct StateTracker {
    tx: Arc<watch::Sender<ServiceState>>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ServiceState::Init);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> ServiceState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.tx.subscribe()
    }

    /// Moves to `next` if the transition is allowed. Returns false (and logs) otherwise.
    pub fn transition(&self, next: ServiceState) -> bool {
        let current = self.current();
        if current == next {
            return true;
        }
        if !current.can_transition_to(next) {
            warn!(from = %current, to = %next, "Ignoring invalid service state transition");
            return false;
        }
        self.tx.send_replace(next);
        info!(from = %current, to = %next, "Service state changed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ServiceState::*;

    #[test]
    fn test_happy_path_transitions() {
        let tracker = StateTracker::new();
        for next in [Connecting, Running, Degraded, Running, ShuttingDown, Stopped] {
            assert!(tracker.transition(next), "to {}", next);
        }
        assert!(tracker.current().is_terminal());
    }

    #[test]
    fn test_fatal_connect_goes_straight_to_stopped() {
        let tracker = StateTracker::new();
        tracker.transition(Connecting);
        assert!(tracker.transition(Stopped));
    }

    #[test]
    fn test_stopped_is_terminal() {
        for next in [Init, Connecting, Running, Degraded, ShuttingDown] {
            assert!(!Stopped.can_transition_to(next));
        }
    }

    #[test]
    fn test_invalid_transition_is_ignored() {
        let tracker = StateTracker::new();
        assert!(!tracker.transition(Running));
        assert_eq!(tracker.current(), Init);
        assert!(!Running.can_transition_to(Connecting));
        assert!(!ShuttingDown.can_transition_to(Running));
    }

    #[test]
    fn test_subscribers_see_latest_state() {
        let tracker = StateTracker::new();
        let rx = tracker.subscribe();
        tracker.transition(Connecting);
        assert_eq!(*rx.borrow(), Connecting);
    }
}
