use std::path::PathBuf;

use super::utils::{env_var, parse_bool, parse_env_or};
use super::{
    DEFAULT_HOST, DEFAULT_MACHINE_DETECTION, DEFAULT_PORT, DEFAULT_RATE_LIMIT_BURST_SIZE,
    DEFAULT_RATE_LIMIT_REQUESTS_PER_SECOND, DEFAULT_TWILIO_API_BASE_URL,
    DEFAULT_TWILIO_TIMEOUT_SECONDS, LIVEKIT_SIP_URI, PUBLIC_BASE_URL, ServerConfig, TWILIO_ACCOUNT_SID,
    TWILIO_AUTH_TOKEN, TWILIO_FROM_NUMBER, TlsConfig,
};

/// Build a configuration from environment variables and defaults
///
/// Only format errors are reported here; unset Twilio or LiveKit settings are valid.
pub fn load_from_env() -> Result<ServerConfig, String> {
    let tls = load_tls_from_env()?;

    // An explicitly empty TWILIO_MACHINE_DETECTION disables detection; unset keeps the default.
    let twilio_machine_detection = match std::env::var("TWILIO_MACHINE_DETECTION") {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(value.trim().to_string()),
        Err(_) => Some(DEFAULT_MACHINE_DETECTION.to_string()),
    };

    Ok(ServerConfig {
        host: env_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: parse_env_or("PORT", DEFAULT_PORT)?,
        tls,
        twilio_account_sid: env_var(TWILIO_ACCOUNT_SID),
        twilio_auth_token: env_var(TWILIO_AUTH_TOKEN),
        twilio_from_number: env_var(TWILIO_FROM_NUMBER),
        twilio_api_base_url: env_var("TWILIO_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE_URL.to_string()),
        twilio_machine_detection,
        twilio_timeout_seconds: parse_env_or(
            "TWILIO_TIMEOUT_SECONDS",
            DEFAULT_TWILIO_TIMEOUT_SECONDS,
        )?,
        public_base_url: env_var(PUBLIC_BASE_URL),
        livekit_sip_uri: env_var(LIVEKIT_SIP_URI),
        cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
        rate_limit_requests_per_second: parse_env_or(
            "RATE_LIMIT_REQUESTS_PER_SECOND",
            DEFAULT_RATE_LIMIT_REQUESTS_PER_SECOND,
        )?,
        rate_limit_burst_size: parse_env_or(
            "RATE_LIMIT_BURST_SIZE",
            DEFAULT_RATE_LIMIT_BURST_SIZE,
        )?,
    })
}

fn load_tls_from_env() -> Result<Option<TlsConfig>, String> {
    let enabled = match env_var("TLS_ENABLED") {
        Some(raw) => parse_bool(&raw)
            .ok_or_else(|| format!("Invalid value for TLS_ENABLED: '{raw}'"))?,
        None => false,
    };

    if !enabled {
        return Ok(None);
    }

    match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Ok(Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        })),
        _ => Err("TLS_ENABLED is set but TLS_CERT_PATH and TLS_KEY_PATH are not both set".to_string()),
    }
}
