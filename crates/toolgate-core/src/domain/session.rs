//! Session lifecycle states.

use serde::{Deserialize, Serialize};

/// State of one bridged client session.
///
/// ```text
/// Resolving ─► Starting ─► Active ─► Cancelling ─► Terminated
///     │            │
///     └────────────┴──────────────────────────────► Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Parsing the connector id and building the launch spec.
    Resolving,
    /// Spawning the connector subprocess.
    Starting,
    /// Relay and disconnect monitor are racing.
    Active,
    /// One side finished; the other is being cancelled.
    Cancelling,
    /// Teardown done, terminal response emitted.
    Terminated,
}

impl SessionState {
    /// Whether `next` is a legal successor of `self`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Resolving, Self::Starting | Self::Terminated)
                | (Self::Starting, Self::Active | Self::Terminated)
                | (Self::Active, Self::Cancelling)
                | (Self::Cancelling, Self::Terminated)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        let path = [
            SessionState::Resolving,
            SessionState::Starting,
            SessionState::Active,
            SessionState::Cancelling,
            SessionState::Terminated,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{pair:?}");
        }
    }

    #[test]
    fn early_failures_go_straight_to_terminated() {
        assert!(SessionState::Resolving.can_transition_to(SessionState::Terminated));
        assert!(SessionState::Starting.can_transition_to(SessionState::Terminated));
    }

    #[test]
    fn active_cannot_skip_cancelling() {
        assert!(!SessionState::Active.can_transition_to(SessionState::Terminated));
        assert!(!SessionState::Terminated.can_transition_to(SessionState::Resolving));
        assert!(SessionState::Terminated.is_terminal());
    }
}
