//! The seam between a session and the message-level protocol.
//!
//! A [`BridgeFactory`] turns a connector's stdio channels into a
//! [`ProtocolBridge`]; the session manager only ever calls
//! [`ProtocolBridge::run`] and cancels it through a token.

mod codec;
mod line;

use std::io;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use toolgate_runtime::ProcessStdio;

pub use line::{LineBridgeFactory, LineRelay};

/// Largest stdout line forwarded to the client by default (4 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Subprocess side of a bridge: bytes from its stdout, bytes to its stdin.
pub struct SubprocessChannels {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
}

impl SubprocessChannels {
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }
}

impl From<ProcessStdio> for SubprocessChannels {
    fn from(stdio: ProcessStdio) -> Self {
        Self::new(stdio.stdout, stdio.stdin)
    }
}

impl std::fmt::Debug for SubprocessChannels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubprocessChannels").finish_non_exhaustive()
    }
}

/// Client side of a bridge, already decoded into JSON messages.
///
/// `inbound` closes when the client stops sending; `outbound` fails to send
/// once the client stream is gone.
#[derive(Debug)]
pub struct ClientStreams {
    pub inbound: mpsc::Receiver<Value>,
    pub outbound: mpsc::Sender<Value>,
}

/// Options handed to the bridge when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Name used to identify this bridge in logs.
    pub server_name: String,
    /// Stdout lines longer than this are dropped.
    pub max_message_bytes: usize,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            server_name: "toolgate".to_string(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

/// Which side ended a relay that finished on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client's inbound stream closed.
    ClientClosed,
    /// The connector closed its stdout.
    ConnectorClosed,
    /// The client's outbound stream is gone.
    ClientGone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Completed(CloseReason),
    Cancelled,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Connector I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Relay task aborted: {0}")]
    Aborted(String),
}

/// Server-side object driving message exchange for one session.
#[async_trait]
pub trait ProtocolBridge: Send {
    /// Run until either side closes, an unrecoverable error occurs, or
    /// `cancel` fires. Cancellation must be observed promptly.
    async fn run(
        self: Box<Self>,
        client: ClientStreams,
        init: InitOptions,
        cancel: CancellationToken,
    ) -> Result<RelayOutcome, RelayError>;
}

/// Builds a bridge for a freshly spawned connector.
pub trait BridgeFactory: Send + Sync {
    fn create(&self, channels: SubprocessChannels) -> Box<dyn ProtocolBridge>;
}
