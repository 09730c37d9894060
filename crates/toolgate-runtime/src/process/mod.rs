//! Connector subprocess spawning and control.

mod teardown;

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use toolgate_core::LaunchSpec;

use crate::error::{SpawnError, TerminationError};

pub use teardown::{ProcessGuard, TeardownOutcome, TeardownPolicy, teardown};

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Result of delivering the graceful stop signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDelivery {
    Delivered,
    /// The process no longer exists.
    ProcessGone,
}

/// Result of a bounded wait for process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited,
    TimedOut,
}

/// Control surface of a running connector process.
///
/// Implemented by [`ConnectorProcess`]; the teardown protocol is written
/// against this trait so it can be driven by a scripted process in tests.
#[async_trait]
pub trait ProcessControl: Send {
    fn pid(&self) -> Option<u32>;

    /// Whether the process has not yet exited.
    fn is_running(&mut self) -> bool;

    /// Send the graceful stop signal.
    fn terminate(&mut self) -> Result<SignalDelivery, TerminationError>;

    /// Send the forced stop signal. Does not wait for exit.
    fn kill(&mut self) -> Result<(), TerminationError>;

    /// Wait up to `timeout` for the process to exit.
    async fn wait(&mut self, timeout: Duration) -> Result<WaitOutcome, TerminationError>;
}

/// The two ordered byte channels of a connector: its stdin and stdout.
#[derive(Debug)]
pub struct ProcessStdio {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// A spawned connector subprocess.
///
/// The child is spawned with `kill_on_drop`, so dropping the handle without
/// a teardown still stops the process.
#[derive(Debug)]
pub struct ConnectorProcess {
    child: Child,
    pid: Option<u32>,
}

/// Spawn the connector described by `spec`.
///
/// stdin and stdout are piped and handed back as [`ProcessStdio`]; stderr is
/// inherited so connector diagnostics land in the server's own stderr.
pub fn spawn(spec: &LaunchSpec) -> Result<(ConnectorProcess, ProcessStdio), SpawnError> {
    let mut child = Command::new(&spec.command)
        .args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SpawnError::Io {
            command: spec.command.clone(),
            source,
        })?;

    let stdin = child.stdin.take().ok_or(SpawnError::MissingPipe("stdin"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or(SpawnError::MissingPipe("stdout"))?;

    let pid = child.id();
    debug!(command = %spec.command, ?pid, "Spawned connector process");

    Ok((ConnectorProcess { child, pid }, ProcessStdio { stdin, stdout }))
}

#[async_trait]
impl ProcessControl for ConnectorProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<SignalDelivery, TerminationError> {
        // `id()` is None once the child has been reaped.
        let Some(pid) = self.child.id() else {
            return Ok(SignalDelivery::ProcessGone);
        };
        let raw = i32::try_from(pid).map_err(|e| TerminationError::Signal {
            pid,
            reason: e.to_string(),
        })?;

        match signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
            Ok(()) => Ok(SignalDelivery::Delivered),
            Err(nix::errno::Errno::ESRCH) => Ok(SignalDelivery::ProcessGone),
            Err(e) => Err(TerminationError::Signal {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<SignalDelivery, TerminationError> {
        // No graceful signal available; stop immediately.
        self.child
            .start_kill()
            .map(|()| SignalDelivery::Delivered)
            .map_err(TerminationError::Kill)
    }

    fn kill(&mut self) -> Result<(), TerminationError> {
        self.child.start_kill().map_err(TerminationError::Kill)
    }

    async fn wait(&mut self, timeout: Duration) -> Result<WaitOutcome, TerminationError> {
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(pid = ?self.pid, %status, "Connector process exited");
                Ok(WaitOutcome::Exited)
            }
            Ok(Err(e)) => Err(TerminationError::Wait(e)),
            Err(_) => Ok(WaitOutcome::TimedOut),
        }
    }
}
