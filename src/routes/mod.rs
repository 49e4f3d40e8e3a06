pub mod api;
pub mod webhooks;

use axum::{Router, routing::get};
use http::{HeaderValue, Method, header};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use crate::errors::app_error::{AppError, AppResult};
use crate::handlers::api::health_check;
use crate::state::AppState;

/// Rates at or above this many requests per second disable rate limiting
pub const RATE_LIMIT_DISABLED_THRESHOLD: u32 = 100_000;

/// Combine the public health route, webhooks and call API into one router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(webhooks::create_webhook_router())
        .merge(api::create_api_router())
        .with_state(state)
}

/// Full application: routes plus CORS, per-IP rate limiting and security headers
pub fn create_app(state: Arc<AppState>) -> AppResult<Router> {
    let rate_limit_rps = state.config.rate_limit_requests_per_second;
    let rate_limit_burst = state.config.rate_limit_burst_size;
    let cors_layer = cors_layer(state.config.cors_allowed_origins.as_deref());

    let governor_layer = if rate_limit_rps < RATE_LIMIT_DISABLED_THRESHOLD {
        // The builder takes the interval after which one request is replenished.
        let governor_config = GovernorConfigBuilder::default()
            .per_nanosecond(replenish_interval_nanos(rate_limit_rps))
            .burst_size(rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| AppError::Internal("Failed to build rate limiter config".into()))?;
        Some(GovernorLayer::new(governor_config))
    } else {
        info!(
            "Rate limiting disabled (rate >= {}/s)",
            RATE_LIMIT_DISABLED_THRESHOLD
        );
        None
    };

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    Ok(create_router(state)
        .layer(cors_layer)
        .layer(tower::util::option_layer(governor_layer))
        .layer(security_headers))
}

/// Nanoseconds between replenished requests for a requests-per-second rate
fn replenish_interval_nanos(requests_per_second: u32) -> u64 {
    (1_000_000_000 / u64::from(requests_per_second.max(1))).max(1)
}

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    match allowed_origins {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(false),
        Some(origins) => {
            // Parse comma-separated origins
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(methods)
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true)
        }
        // No allow_origin = same-origin only. Twilio webhooks are server-to-server and
        // unaffected.
        None => CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(false),
    }
}
