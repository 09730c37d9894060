//! Newline-delimited JSON relay.
//!
//! Each client message is written to the connector's stdin as one JSON line.
//! Each stdout line that parses as JSON is forwarded to the client; anything
//! else (banners, log noise) is skipped.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::codec::{StdoutCodec, StdoutLine};
use super::{
    BridgeFactory, ClientStreams, CloseReason, InitOptions, ProtocolBridge, RelayError,
    RelayOutcome, SubprocessChannels,
};

/// Builds a [`LineRelay`] per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBridgeFactory;

impl BridgeFactory for LineBridgeFactory {
    fn create(&self, channels: SubprocessChannels) -> Box<dyn ProtocolBridge> {
        Box::new(LineRelay::new(channels))
    }
}

#[derive(Debug)]
pub struct LineRelay {
    channels: SubprocessChannels,
}

impl LineRelay {
    pub const fn new(channels: SubprocessChannels) -> Self {
        Self { channels }
    }
}

type StdoutFrames = FramedRead<Box<dyn AsyncRead + Send + Unpin>, StdoutCodec>;

#[async_trait]
impl ProtocolBridge for LineRelay {
    async fn run(
        self: Box<Self>,
        client: ClientStreams,
        init: InitOptions,
        cancel: CancellationToken,
    ) -> Result<RelayOutcome, RelayError> {
        let SubprocessChannels { reader, mut writer } = self.channels;
        let ClientStreams {
            mut inbound,
            outbound,
        } = client;
        let mut stdout = FramedRead::new(reader, StdoutCodec::new(init.max_message_bytes));
        let server = init.server_name.as_str();

        debug!(server, "Relay started");

        // Both directions run concurrently; stdout keeps draining while a
        // stdin write is pending.
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(server, "Relay cancelled");
                return Ok(RelayOutcome::Cancelled);
            }
            closed = pump_to_connector(&mut inbound, &mut writer, server) => closed,
            closed = pump_to_client(&mut stdout, &outbound, init.max_message_bytes, server) => closed,
        };

        result.map(RelayOutcome::Completed)
    }
}

/// Client messages to connector stdin, until the client stops sending.
async fn pump_to_connector<W>(
    inbound: &mut mpsc::Receiver<Value>,
    writer: &mut W,
    server: &str,
) -> Result<CloseReason, RelayError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    while let Some(message) = inbound.recv().await {
        let line = encode_line(&message)?;
        write_line(writer, &line).await?;
    }
    debug!(server, "Client inbound stream closed");
    Ok(CloseReason::ClientClosed)
}

/// Connector stdout to the client, until either end goes away.
async fn pump_to_client(
    stdout: &mut StdoutFrames,
    outbound: &mpsc::Sender<Value>,
    max_message_bytes: usize,
    server: &str,
) -> Result<CloseReason, RelayError> {
    while let Some(frame) = stdout.next().await {
        let line = match frame? {
            StdoutLine::Oversized => {
                warn!(
                    server,
                    max_bytes = max_message_bytes,
                    "Skipping oversized connector output line"
                );
                continue;
            }
            StdoutLine::Garbled => {
                debug!(server, "Skipping non-UTF-8 connector output line");
                continue;
            }
            StdoutLine::Line(line) => line,
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(message) = serde_json::from_str::<Value>(trimmed) else {
            debug!(server, line = trimmed, "Skipping non-JSON connector output");
            continue;
        };

        if outbound.send(message).await.is_err() {
            debug!(server, "Client outbound stream gone");
            return Ok(CloseReason::ClientGone);
        }
    }
    debug!(server, "Connector closed stdout");
    Ok(CloseReason::ConnectorClosed)
}

fn encode_line(message: &Value) -> Result<Vec<u8>, RelayError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

async fn write_line<W>(writer: &mut W, line: &[u8]) -> Result<(), RelayError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(line).await?;
    writer.flush().await?;
    Ok(())
}
