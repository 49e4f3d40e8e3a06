use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// Configuration readiness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub twilio_ready: bool,
    pub from_number: Option<String>,
    pub public_base_url: bool,
    pub sip_uri_configured: bool,
}

/// Health check
///
/// Reports which parts of the bridge are configured. Never contacts Twilio.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;

    Json(HealthResponse {
        status: "ok".to_string(),
        twilio_ready: state.twilio_ready(),
        from_number: config.twilio_from_number.clone(),
        public_base_url: config.public_base_url.is_some(),
        sip_uri_configured: config.livekit_sip_uri.is_some(),
    })
}
