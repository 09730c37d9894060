use std::sync::Arc;

use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use toolgate_core::{ConnectorResolver, SessionState};
use toolgate_runtime::{
    ClientConnection, ConnectorProcess, DisconnectMonitor, ProcessGuard, WatchOutcome, spawn,
};

use super::{
    RelayErrorPolicy, SessionError, SessionLifecycle, SessionOutcome, SessionReport,
    SessionSettings,
};
use crate::relay::{BridgeFactory, ClientStreams, ProtocolBridge, RelayError, RelayOutcome};

/// Result of one of the two racing activities.
enum Activity {
    Relay(Result<RelayOutcome, RelayError>),
    Monitor(WatchOutcome),
}

type Joined = Result<(Id, Activity), JoinError>;

/// Runs bridged sessions: resolve, spawn, race relay against the disconnect
/// monitor, cancel the loser, tear the connector down.
///
/// Shared by every session; holds no per-session state.
pub struct SessionManager {
    resolver: Arc<ConnectorResolver>,
    bridges: Arc<dyn BridgeFactory>,
    settings: SessionSettings,
}

impl SessionManager {
    pub fn new(
        resolver: Arc<ConnectorResolver>,
        bridges: Arc<dyn BridgeFactory>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            resolver,
            bridges,
            settings,
        }
    }

    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Run one session to completion.
    ///
    /// Returns once the connector has been torn down. Errors are local to
    /// this session: resolution and spawn failures end it before the relay
    /// starts, relay failures follow [`RelayErrorPolicy`].
    pub async fn run_session(
        &self,
        connector_id: &str,
        client: ClientStreams,
        connection: Arc<dyn ClientConnection>,
    ) -> Result<SessionReport, SessionError> {
        let mut lifecycle = SessionLifecycle::new(connector_id);

        // A failed resolution still moves on to Starting, where the missing
        // launch spec is fatal.
        let resolved = self.resolver.resolve_raw(connector_id).await;
        if let Err(e) = &resolved {
            warn!(connector_id, error = %e, "Failed to resolve connector");
        }

        lifecycle.advance(SessionState::Starting);
        let spec = match resolved {
            Ok(spec) => spec,
            Err(e) => {
                self.terminate_unstarted(&mut lifecycle).await;
                return Err(SessionError::Configuration(e));
            }
        };

        let (process, stdio) = match spawn(&spec) {
            Ok(spawned) => spawned,
            Err(e) => {
                warn!(connector_id, command = %spec.command, error = %e, "Failed to spawn connector");
                self.terminate_unstarted(&mut lifecycle).await;
                return Err(SessionError::Spawn(e));
            }
        };
        let guard = ProcessGuard::new(process, self.settings.teardown);
        let pid = guard.pid();
        info!(connector_id, ?pid, command = %spec.command, "Connector started");

        lifecycle.advance(SessionState::Active);
        let bridge = self.bridges.create(stdio.into());
        let (outcome, relay_error) = self
            .race(&mut lifecycle, bridge, client, connection)
            .await;

        // Both activities have stopped; nothing touches the pipes any more.
        let teardown = guard.teardown().await;
        lifecycle.advance(SessionState::Terminated);

        info!(connector_id, ?pid, ?outcome, ?teardown, "Session ended");

        match (relay_error, self.settings.relay_errors) {
            (Some(e), RelayErrorPolicy::Propagate) => Err(SessionError::Relay(e)),
            (relay_error, _) => Ok(SessionReport {
                connector_id: connector_id.to_string(),
                pid,
                outcome,
                relay_error,
                teardown,
                history: lifecycle.into_history(),
            }),
        }
    }

    async fn terminate_unstarted(&self, lifecycle: &mut SessionLifecycle) {
        let teardown = ProcessGuard::<ConnectorProcess>::empty(self.settings.teardown)
            .teardown()
            .await;
        lifecycle.advance(SessionState::Terminated);
        debug!(connector_id = lifecycle.connector_id(), ?teardown, "Session ended before start");
    }

    /// Race the relay against the disconnect monitor.
    ///
    /// Whichever finishes first wins; the other is cancelled through its own
    /// token and awaited before this returns.
    async fn race(
        &self,
        lifecycle: &mut SessionLifecycle,
        bridge: Box<dyn ProtocolBridge>,
        client: ClientStreams,
        connection: Arc<dyn ClientConnection>,
    ) -> (SessionOutcome, Option<RelayError>) {
        let relay_cancel = CancellationToken::new();
        let monitor_cancel = CancellationToken::new();
        let monitor = DisconnectMonitor::new(self.settings.poll_interval);

        // Dropping the set (caller cancelled) aborts both tasks.
        let mut activities = JoinSet::new();
        let relay_id = activities
            .spawn({
                let init = self.settings.init.clone();
                let cancel = relay_cancel.clone();
                async move { Activity::Relay(bridge.run(client, init, cancel).await) }
            })
            .id();
        activities.spawn({
            let cancel = monitor_cancel.clone();
            async move { Activity::Monitor(monitor.watch(connection.as_ref(), &cancel).await) }
        });

        let first = activities.join_next_with_id().await;
        lifecycle.advance(SessionState::Cancelling);

        let relay_won = match &first {
            Some(Ok((id, _))) => *id == relay_id,
            Some(Err(e)) => e.id() == relay_id,
            None => false,
        };
        if relay_won {
            debug!(connector_id = lifecycle.connector_id(), "Relay finished first, cancelling monitor");
            monitor_cancel.cancel();
        } else {
            debug!(connector_id = lifecycle.connector_id(), "Client gone, cancelling relay");
            relay_cancel.cancel();
        }

        let second = activities.join_next_with_id().await;

        let outcome = if relay_won {
            match &first {
                Some(Ok((_, Activity::Relay(Ok(RelayOutcome::Completed(reason)))))) => {
                    SessionOutcome::RelayCompleted(*reason)
                }
                Some(Ok((_, Activity::Relay(Ok(RelayOutcome::Cancelled))))) => {
                    SessionOutcome::ClientDisconnected
                }
                _ => SessionOutcome::RelayFailed,
            }
        } else {
            SessionOutcome::ClientDisconnected
        };

        let mut relay_error = None;
        for joined in [first, second].into_iter().flatten() {
            if let Some(e) = relay_failure(joined, relay_id) {
                warn!(connector_id = lifecycle.connector_id(), error = %e, "Relay failed");
                relay_error = Some(e);
            }
        }

        (outcome, relay_error)
    }
}

/// Extract a relay failure from a joined activity, if there is one.
///
/// Cancellation of the losing side is expected and never a failure.
fn relay_failure(joined: Joined, relay_id: Id) -> Option<RelayError> {
    match joined {
        Ok((_, Activity::Relay(Err(e)))) => Some(e),
        Ok(_) => None,
        Err(e) if e.id() == relay_id => Some(RelayError::Aborted(e.to_string())),
        Err(e) => {
            warn!(error = %e, "Disconnect monitor task failed");
            None
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
