//! HTTP error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    /// No such session (never existed, or already ended).
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The session exists but no longer accepts messages.
    #[error("Gone: {0}")]
    Gone(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Gone(_) => StatusCode::GONE,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (Self::NotFound(message)
        | Self::BadRequest(message)
        | Self::Gone(message)) = self;

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            HttpError::NotFound(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(HttpError::Gone(String::new()).status(), StatusCode::GONE);
        assert_eq!(
            HttpError::BadRequest(String::new()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
