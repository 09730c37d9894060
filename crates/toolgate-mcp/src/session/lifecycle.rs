use tracing::{debug, warn};

use toolgate_core::SessionState;

/// Tracks one session's state and the path it took.
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    connector_id: String,
    history: Vec<SessionState>,
}

impl SessionLifecycle {
    pub fn new(connector_id: impl Into<String>) -> Self {
        let connector_id = connector_id.into();
        debug!(connector_id = %connector_id, state = ?SessionState::Resolving, "Session state");
        Self {
            connector_id,
            history: vec![SessionState::Resolving],
        }
    }

    pub fn state(&self) -> SessionState {
        self.history
            .last()
            .copied()
            .unwrap_or(SessionState::Resolving)
    }

    pub fn connector_id(&self) -> &str {
        &self.connector_id
    }

    /// Move to `next`. Illegal transitions are logged and still applied so
    /// the session always reaches `Terminated`.
    pub fn advance(&mut self, next: SessionState) {
        let current = self.state();
        if !current.can_transition_to(next) {
            warn!(
                connector_id = %self.connector_id,
                from = ?current,
                to = ?next,
                "Unexpected session state transition"
            );
        }
        debug!(connector_id = %self.connector_id, state = ?next, "Session state");
        self.history.push(next);
    }

    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn into_history(self) -> Vec<SessionState> {
        self.history
    }
}
