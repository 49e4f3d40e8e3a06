use axum::{Json, extract::State};
use std::sync::Arc;

use crate::core::call_initiator::{CallInitiated, OutboundCallRequest, initiate_call};
use crate::errors::app_error::AppResult;
use crate::state::AppState;

/// Start an outbound call
///
/// Twilio dials `to` and, once answered, fetches `/twiml?room=<room>` which bridges
/// the call into LiveKit.
pub async fn start_call(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OutboundCallRequest>,
) -> AppResult<Json<CallInitiated>> {
    let initiated = initiate_call(
        &state.config,
        state.call_originator.as_deref(),
        &payload,
    )
    .await?;

    Ok(Json(initiated))
}
