//! SSE session entry point.
//!
//! Each `GET {prefix}/sse/{connector_id}` opens one session. The session runs
//! in its own task; the response is the SSE stream, which ends exactly when
//! the session does.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use toolgate_mcp::ClientStreams;
use toolgate_runtime::DisconnectSignal;

use crate::state::AppState;

/// Buffered messages per direction per session.
const CHANNEL_CAPACITY: usize = 64;
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Marks the client disconnected when the SSE body is dropped.
struct DisconnectOnDrop(DisconnectSignal);

impl Drop for DisconnectOnDrop {
    fn drop(&mut self) {
        self.0.mark_disconnected();
    }
}

pub async fn connect(
    State(state): State<AppState>,
    Path(connector_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let session_id = Uuid::new_v4();
    let (inbound_tx, inbound_rx) = mpsc::channel::<Value>(CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel::<Value>(CHANNEL_CAPACITY);
    let signal = DisconnectSignal::new();

    let registration = state.registry.register(session_id, inbound_tx);
    let endpoint = state.message_endpoint(&session_id);

    let span = info_span!("session", %session_id, connector_id = %connector_id);
    tokio::spawn(
        {
            let state = Arc::clone(&state);
            let connection = Arc::new(signal.clone());
            async move {
                // Deregisters on every exit, unwinding included.
                let _registration = registration;
                let client = ClientStreams {
                    inbound: inbound_rx,
                    outbound: outbound_tx,
                };
                match state
                    .sessions
                    .run_session(&connector_id, client, connection)
                    .await
                {
                    Ok(report) => info!(outcome = ?report.outcome, "Session closed"),
                    Err(e) => warn!(error = %e, "Session failed"),
                }
            }
        }
        .instrument(span),
    );

    let guard = DisconnectOnDrop(signal);
    let opening = stream::once(async move { Event::default().event("endpoint").data(endpoint) });
    let messages = ReceiverStream::new(outbound_rx).filter_map(|message| async move {
        match Event::default().event("message").json_data(&message) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "Failed to encode SSE message");
                None
            }
        }
    });

    let stream = opening.chain(messages).map(move |event| {
        let _alive = &guard;
        Ok(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
