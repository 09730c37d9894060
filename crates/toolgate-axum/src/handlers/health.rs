//! Liveness and readiness probes. Independent of any session state.

use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub output: String,
    pub message: String,
}

impl ProbeResponse {
    fn success(state: &str) -> Self {
        Self {
            output: "success".to_string(),
            message: format!("toolgate service is {state} on {}", Utc::now().to_rfc3339()),
        }
    }
}

pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse::success("live"))
}

pub async fn ready() -> Json<ProbeResponse> {
    Json(ProbeResponse::success("ready"))
}
