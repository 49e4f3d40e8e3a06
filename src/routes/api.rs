use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use crate::handlers::calls;
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router for call control
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/call", post(calls::start_call))
        .layer(TraceLayer::new_for_http())
}
