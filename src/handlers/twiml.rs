use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::call_router::{CallEvent, route_call};
use crate::core::twiml::{TWIML_CONTENT_TYPE, dial_sip};
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// TwiML webhook for both inbound and outbound calls
///
/// - Inbound: someone calls the Twilio number and Twilio posts the call details here
/// - Outbound: Twilio fetches `/twiml?room=...` after a call placed through `/call`
///   is answered
///
/// Both receive the same `<Dial><Sip>` directive pointing at the LiveKit SIP URI.
/// The routed room is logged but not encoded into the URI; room assignment is left
/// to the LiveKit dispatch rule.
pub async fn serve_twiml(
    State(state): State<Arc<AppState>>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let event = CallEvent::from_request_parts(&method, query.as_deref(), content_type, &body);
    let routed = route_call(&event);

    if let Some(call_sid) = event.form_value("CallSid") {
        info!(
            "Twilio webhook - call_sid={}, direction={}, from={}, to={}, status={}",
            call_sid,
            event.form_value("Direction").unwrap_or("-"),
            event.form_value("From").unwrap_or("-"),
            event.form_value("To").unwrap_or("-"),
            event.form_value("CallStatus").unwrap_or("-"),
        );
    }
    debug!("Routed {} webhook to room={} ({:?})", method, routed.room, routed.source);

    let sip_uri = state
        .config
        .livekit_sip_uri
        .as_deref()
        .ok_or(AppError::SessionUriMissing)?;

    let twiml = dial_sip(sip_uri).map_err(AppError::Internal)?;

    info!("Bridging call in room={} to LiveKit SIP", routed.room);

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, TWIML_CONTENT_TYPE)],
        twiml,
    )
        .into_response())
}
