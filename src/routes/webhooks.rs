use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::twiml;
use crate::state::AppState;
use std::sync::Arc;

/// Create the router for Twilio voice webhooks
///
/// `/` serves the same TwiML as `/twiml`, so the bare base URL can be used as the
/// phone number's webhook in the Twilio console.
pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(twiml::serve_twiml).post(twiml::serve_twiml))
        .route("/twiml", get(twiml::serve_twiml).post(twiml::serve_twiml))
        .layer(TraceLayer::new_for_http())
}
