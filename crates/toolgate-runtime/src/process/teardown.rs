//! Connector teardown: SIGTERM, bounded grace period, then a single kill.

use std::time::Duration;

use tracing::{debug, warn};

use super::{ConnectorProcess, ProcessControl, SignalDelivery, WaitOutcome};
use crate::error::TerminationError;

/// Default time a connector gets to exit after the graceful stop signal.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownPolicy {
    pub grace_period: Duration,
}

impl Default for TeardownPolicy {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

/// How a teardown ended.
#[derive(Debug)]
pub enum TeardownOutcome {
    /// No process was ever started.
    NotStarted,
    /// The process had already exited (or vanished while being signalled).
    AlreadyExited,
    /// The process exited within the grace period.
    Graceful,
    /// The grace period elapsed and the process was killed.
    Killed,
    /// Stopping the process failed. Recorded, never fatal.
    Failed(TerminationError),
}

impl TeardownOutcome {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Run the teardown protocol against `process`.
///
/// 1. No process: nothing to do.
/// 2. Already exited: nothing to do.
/// 3. Send the graceful stop signal and wait up to the grace period.
/// 4. On timeout, kill once; there is no second wait.
///
/// A process that disappears while being signalled counts as exited.
pub async fn teardown<P>(process: Option<&mut P>, policy: &TeardownPolicy) -> TeardownOutcome
where
    P: ProcessControl + ?Sized,
{
    let Some(process) = process else {
        return TeardownOutcome::NotStarted;
    };
    let pid = process.pid();

    if !process.is_running() {
        debug!(?pid, "Connector already exited, nothing to tear down");
        return TeardownOutcome::AlreadyExited;
    }

    match process.terminate() {
        Ok(SignalDelivery::Delivered) => {}
        Ok(SignalDelivery::ProcessGone) => {
            debug!(?pid, "Connector vanished before SIGTERM");
            return TeardownOutcome::AlreadyExited;
        }
        Err(e) => {
            warn!(?pid, error = %e, "Failed to terminate connector");
            return TeardownOutcome::Failed(e);
        }
    }

    match process.wait(policy.grace_period).await {
        Ok(WaitOutcome::Exited) => TeardownOutcome::Graceful,
        Ok(WaitOutcome::TimedOut) => {
            warn!(
                ?pid,
                grace_ms = policy.grace_period.as_millis(),
                "Connector ignored SIGTERM, killing"
            );
            match process.kill() {
                Ok(()) => TeardownOutcome::Killed,
                Err(e) => {
                    warn!(?pid, error = %e, "Failed to kill connector");
                    TeardownOutcome::Failed(e)
                }
            }
        }
        Err(e) => {
            warn!(?pid, error = %e, "Failed waiting for connector exit");
            TeardownOutcome::Failed(e)
        }
    }
}

/// Owns a session's connector process and guarantees one teardown attempt.
///
/// The normal path consumes the guard with [`ProcessGuard::teardown`]. If the
/// guard is dropped instead (the owning task was aborted or panicked) the
/// process is killed from `Drop`. Either way exactly one attempt is made.
pub struct ProcessGuard<P: ProcessControl = ConnectorProcess> {
    process: Option<P>,
    policy: TeardownPolicy,
}

impl<P: ProcessControl> ProcessGuard<P> {
    pub const fn new(process: P, policy: TeardownPolicy) -> Self {
        Self {
            process: Some(process),
            policy,
        }
    }

    /// A guard for a session whose process never started.
    pub const fn empty(policy: TeardownPolicy) -> Self {
        Self {
            process: None,
            policy,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(P::pid)
    }

    pub async fn teardown(mut self) -> TeardownOutcome {
        let outcome = teardown(self.process.as_mut(), &self.policy).await;
        self.process = None;
        outcome
    }
}

impl<P: ProcessControl> Drop for ProcessGuard<P> {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            if process.is_running() {
                warn!(pid = ?process.pid(), "Process guard dropped without teardown, killing");
                if let Err(e) = process.kill() {
                    warn!(pid = ?process.pid(), error = %e, "Failed to kill connector");
                }
            }
        }
    }
}

impl<P: ProcessControl> std::fmt::Debug for ProcessGuard<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessGuard")
            .field("pid", &self.pid())
            .field("armed", &self.process.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum OnTerm {
        Exit,
        Ignore,
        AlreadyGone,
        Fail,
    }

    #[derive(Default)]
    struct Calls {
        terminate: AtomicUsize,
        kill: AtomicUsize,
    }

    struct ScriptedProcess {
        running: bool,
        on_term: OnTerm,
        term_received: bool,
        calls: Arc<Calls>,
    }

    impl ScriptedProcess {
        fn new(on_term: OnTerm) -> (Self, Arc<Calls>) {
            let calls = Arc::new(Calls::default());
            let process = Self {
                running: true,
                on_term,
                term_received: false,
                calls: calls.clone(),
            };
            (process, calls)
        }
    }

    #[async_trait]
    impl ProcessControl for ScriptedProcess {
        fn pid(&self) -> Option<u32> {
            Some(4242)
        }

        fn is_running(&mut self) -> bool {
            self.running
        }

        fn terminate(&mut self) -> Result<SignalDelivery, TerminationError> {
            self.calls.terminate.fetch_add(1, Ordering::SeqCst);
            self.term_received = true;
            match self.on_term {
                OnTerm::AlreadyGone => {
                    self.running = false;
                    Ok(SignalDelivery::ProcessGone)
                }
                OnTerm::Fail => Err(TerminationError::Signal {
                    pid: 4242,
                    reason: "EPERM".to_string(),
                }),
                OnTerm::Exit | OnTerm::Ignore => Ok(SignalDelivery::Delivered),
            }
        }

        fn kill(&mut self) -> Result<(), TerminationError> {
            self.calls.kill.fetch_add(1, Ordering::SeqCst);
            self.running = false;
            Ok(())
        }

        async fn wait(&mut self, timeout: Duration) -> Result<WaitOutcome, TerminationError> {
            if self.term_received && matches!(self.on_term, OnTerm::Exit) {
                self.running = false;
                return Ok(WaitOutcome::Exited);
            }
            tokio::time::sleep(timeout).await;
            Ok(WaitOutcome::TimedOut)
        }
    }

    #[tokio::test]
    async fn no_process_is_a_no_op() {
        let outcome = teardown::<ScriptedProcess>(None, &TeardownPolicy::default()).await;
        assert!(matches!(outcome, TeardownOutcome::NotStarted));
    }

    #[tokio::test]
    async fn exited_process_is_not_signalled() {
        let (mut process, calls) = ScriptedProcess::new(OnTerm::Exit);
        process.running = false;

        let outcome = teardown(Some(&mut process), &TeardownPolicy::default()).await;

        assert!(matches!(outcome, TeardownOutcome::AlreadyExited));
        assert_eq!(calls.terminate.load(Ordering::SeqCst), 0);
        assert_eq!(calls.kill.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cooperative_process_exits_without_kill() {
        let (mut process, calls) = ScriptedProcess::new(OnTerm::Exit);

        let outcome = teardown(Some(&mut process), &TeardownPolicy::default()).await;

        assert!(matches!(outcome, TeardownOutcome::Graceful));
        assert_eq!(calls.terminate.load(Ordering::SeqCst), 1);
        assert_eq!(calls.kill.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stubborn_process_is_killed_exactly_once() {
        let (mut process, calls) = ScriptedProcess::new(OnTerm::Ignore);
        let started = tokio::time::Instant::now();

        let outcome = teardown(Some(&mut process), &TeardownPolicy::default()).await;

        assert!(matches!(outcome, TeardownOutcome::Killed));
        assert_eq!(calls.terminate.load(Ordering::SeqCst), 1);
        assert_eq!(calls.kill.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= DEFAULT_GRACE_PERIOD);
    }

    #[tokio::test]
    async fn vanished_process_counts_as_exited() {
        let (mut process, calls) = ScriptedProcess::new(OnTerm::AlreadyGone);

        let outcome = teardown(Some(&mut process), &TeardownPolicy::default()).await;

        assert!(matches!(outcome, TeardownOutcome::AlreadyExited));
        assert_eq!(calls.kill.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn signal_failure_is_recorded_not_raised() {
        let (mut process, calls) = ScriptedProcess::new(OnTerm::Fail);

        let outcome = teardown(Some(&mut process), &TeardownPolicy::default()).await;

        assert!(outcome.is_failure());
        assert_eq!(calls.kill.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn guard_teardown_disarms_drop() {
        let (process, calls) = ScriptedProcess::new(OnTerm::Ignore);
        let guard = ProcessGuard::new(process, TeardownPolicy::default());

        let outcome = guard.teardown().await;

        assert!(matches!(outcome, TeardownOutcome::Killed));
        assert_eq!(calls.kill.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropped_guard_kills_running_process() {
        let (process, calls) = ScriptedProcess::new(OnTerm::Ignore);
        let guard = ProcessGuard::new(process, TeardownPolicy::default());

        drop(guard);

        assert_eq!(calls.terminate.load(Ordering::SeqCst), 0);
        assert_eq!(calls.kill.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_guard_reports_not_started() {
        let guard = ProcessGuard::<ScriptedProcess>::empty(TeardownPolicy::default());
        assert_eq!(guard.pid(), None);
        assert!(matches!(guard.teardown().await, TeardownOutcome::NotStarted));
    }
}
