//! Connector subprocess supervision for toolgate.
//!
//! Two concerns live here:
//!
//! - [`process`]: spawning a connector from a [`LaunchSpec`](toolgate_core::LaunchSpec),
//!   controlling it, and the SIGTERM → grace period → kill teardown protocol.
//! - [`monitor`]: the disconnect monitor that polls client liveness until the
//!   client goes away or the monitor is cancelled.

#![deny(unsafe_code)]

mod error;
pub mod monitor;
pub mod process;

pub use error::{SpawnError, TerminationError};
pub use monitor::{ClientConnection, DisconnectMonitor, DisconnectSignal, WatchOutcome};
pub use process::{
    ConnectorProcess, ProcessControl, ProcessGuard, ProcessStdio, SignalDelivery,
    TeardownOutcome, TeardownPolicy, WaitOutcome, spawn, teardown,
};
