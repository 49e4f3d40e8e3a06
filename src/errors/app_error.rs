use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::twilio::TwilioError;

/// Result type for request handling
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced to HTTP callers
///
/// Every variant maps to `500 Internal Server Error` with a `{"detail": "..."}` body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings required to place a call are unset
    #[error(
        "Server not fully configured. Missing: {}. Check env vars and /health.",
        .missing.join(", ")
    )]
    Configuration { missing: Vec<String> },

    /// No LiveKit SIP URI to dial
    #[error("LIVEKIT_SIP_URI not configured.")]
    SessionUriMissing,

    /// Twilio rejected the call or could not be reached
    #[error("Twilio call initiation failed: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn configuration<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Configuration {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<TwilioError> for AppError {
    fn from(err: TwilioError) -> Self {
        Self::Provider(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        error!("Request failed: {}", detail);
        (self.status_code(), Json(json!({ "detail": detail }))).into_response()
    }
}
