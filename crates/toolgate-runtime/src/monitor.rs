//! Client disconnect monitoring.
//!
//! The monitor is policy-free: it polls a [`ClientConnection`] at a fixed
//! interval and returns as soon as the client is gone. It has no deadline of
//! its own and only stops early when its cancellation token fires.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default liveness poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Liveness probe for the client side of a session.
#[async_trait]
pub trait ClientConnection: Send + Sync {
    async fn is_disconnected(&self) -> bool;
}

/// Why [`DisconnectMonitor::watch`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Disconnected,
    Cancelled,
}

/// Polls client liveness until disconnect or cancellation.
#[derive(Debug, Clone, Copy)]
pub struct DisconnectMonitor {
    poll_interval: Duration,
}

impl Default for DisconnectMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl DisconnectMonitor {
    pub const fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Poll `connection` until it reports disconnected or `cancel` fires.
    ///
    /// The first poll happens immediately. Cancellation is checked before
    /// each poll, so no poll runs after the token has been observed.
    pub async fn watch(
        &self,
        connection: &dyn ClientConnection,
        cancel: &CancellationToken,
    ) -> WatchOutcome {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Disconnect monitor cancelled");
                    return WatchOutcome::Cancelled;
                }
                _ = ticker.tick() => {
                    if connection.is_disconnected().await {
                        debug!("Client disconnected");
                        return WatchOutcome::Disconnected;
                    }
                }
            }
        }
    }
}

/// Shared disconnected flag, set by whoever owns the client stream.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct DisconnectSignal {
    disconnected: Arc<AtomicBool>,
}

impl DisconnectSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_disconnected(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientConnection for DisconnectSignal {
    async fn is_disconnected(&self) -> bool {
        self.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Reports disconnected from the `disconnect_at`-th poll onwards.
    struct CountingConnection {
        polls: AtomicUsize,
        disconnect_at: usize,
    }

    impl CountingConnection {
        fn new(disconnect_at: usize) -> Self {
            Self {
                polls: AtomicUsize::new(0),
                disconnect_at,
            }
        }

        fn polls(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClientConnection for CountingConnection {
        async fn is_disconnected(&self) -> bool {
            self.polls.fetch_add(1, Ordering::SeqCst) + 1 >= self.disconnect_at
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_on_first_disconnected_poll() {
        let connection = CountingConnection::new(3);
        let started = tokio::time::Instant::now();

        let outcome = DisconnectMonitor::default()
            .watch(&connection, &CancellationToken::new())
            .await;

        assert_eq!(outcome, WatchOutcome::Disconnected);
        assert_eq!(connection.polls(), 3);
        // First poll is immediate, then one per interval.
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let connection = Arc::new(CountingConnection::new(usize::MAX));
        let cancel = CancellationToken::new();

        let task = tokio::spawn({
            let connection = connection.clone();
            let cancel = cancel.clone();
            async move {
                DisconnectMonitor::default()
                    .watch(connection.as_ref(), &cancel)
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        cancel.cancel();
        assert_eq!(task.await.unwrap(), WatchOutcome::Cancelled);

        let polls = connection.polls();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(connection.polls(), polls);
    }

    #[tokio::test]
    async fn pre_cancelled_monitor_never_polls() {
        let connection = CountingConnection::new(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = DisconnectMonitor::default().watch(&connection, &cancel).await;

        assert_eq!(outcome, WatchOutcome::Cancelled);
        assert_eq!(connection.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn signal_clones_share_state() {
        let signal = DisconnectSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_disconnected().await);

        signal.mark_disconnected();

        let outcome = DisconnectMonitor::new(Duration::from_millis(10))
            .watch(&observer, &CancellationToken::new())
            .await;
        assert_eq!(outcome, WatchOutcome::Disconnected);
    }
}
