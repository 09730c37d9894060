//! Client → connector message ingress.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub session_id: Option<String>,
}

/// Forward one JSON message to a live session.
pub async fn post(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(message): Json<Value>,
) -> Result<StatusCode, HttpError> {
    let raw = query
        .session_id
        .ok_or_else(|| HttpError::BadRequest("session_id is required".to_string()))?;
    let session_id = Uuid::parse_str(&raw)
        .map_err(|_| HttpError::BadRequest(format!("Invalid session ID: {raw}")))?;

    let sender = state
        .registry
        .sender(&session_id)
        .ok_or_else(|| HttpError::NotFound(format!("Could not find session {raw}")))?;

    sender
        .send(message)
        .await
        .map_err(|_| HttpError::Gone(format!("Session {raw} is closed")))?;

    debug!(%session_id, "Accepted client message");
    Ok(StatusCode::ACCEPTED)
}
