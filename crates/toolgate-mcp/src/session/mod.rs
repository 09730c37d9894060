//! Session lifecycle management.

mod lifecycle;
mod manager;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use toolgate_core::{ResolutionError, SessionState};
use toolgate_runtime::monitor::DEFAULT_POLL_INTERVAL;
use toolgate_runtime::{SpawnError, TeardownOutcome, TeardownPolicy};

use crate::relay::{CloseReason, InitOptions, RelayError};

pub use lifecycle::SessionLifecycle;
pub use manager::SessionManager;

/// What happens to a relay failure once it has been logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayErrorPolicy {
    /// Record the failure in the [`SessionReport`]; the session ends normally.
    #[default]
    Swallow,
    /// Return [`SessionError::Relay`] from the session.
    Propagate,
}

/// Per-session tuning, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub teardown: TeardownPolicy,
    pub relay_errors: RelayErrorPolicy,
    pub init: InitOptions,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            teardown: TeardownPolicy::default(),
            relay_errors: RelayErrorPolicy::default(),
            init: InitOptions::default(),
        }
    }
}

/// Session-fatal errors. None of these affect other sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No launch spec for connector: {0}")]
    Configuration(#[from] ResolutionError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error("Relay failed: {0}")]
    Relay(#[source] RelayError),
}

/// Which side ended an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    ClientDisconnected,
    RelayCompleted(CloseReason),
    RelayFailed,
}

/// Summary of a session that reached the active state.
#[derive(Debug)]
pub struct SessionReport {
    pub connector_id: String,
    pub pid: Option<u32>,
    pub outcome: SessionOutcome,
    /// Relay failure recorded under [`RelayErrorPolicy::Swallow`].
    pub relay_error: Option<RelayError>,
    pub teardown: TeardownOutcome,
    pub history: Vec<SessionState>,
}
