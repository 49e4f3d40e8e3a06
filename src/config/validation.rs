use url::Url;

use super::{PUBLIC_BASE_URL, ServerConfig, TlsConfig};

/// Validate a merged configuration
///
/// Unset Twilio and LiveKit settings are not errors; badly formatted ones are.
pub fn validate_config(config: &ServerConfig) -> Result<(), String> {
    validate_tls(&config.tls)?;
    if let Some(url) = config.public_base_url.as_deref() {
        validate_http_url(PUBLIC_BASE_URL, url)?;
    }
    validate_http_url("TWILIO_API_BASE_URL", &config.twilio_api_base_url)?;

    if config.twilio_timeout_seconds == 0 {
        return Err("TWILIO_TIMEOUT_SECONDS must be greater than zero".to_string());
    }
    if config.rate_limit_requests_per_second == 0 || config.rate_limit_burst_size == 0 {
        return Err(
            "RATE_LIMIT_REQUESTS_PER_SECOND and RATE_LIMIT_BURST_SIZE must be greater than zero"
                .to_string(),
        );
    }

    Ok(())
}

/// Validate that the TLS certificate and key files exist
pub fn validate_tls(tls: &Option<TlsConfig>) -> Result<(), String> {
    let Some(tls) = tls else {
        return Ok(());
    };

    if !tls.cert_path.exists() {
        return Err(format!(
            "TLS certificate file not found: {}",
            tls.cert_path.display()
        ));
    }
    if !tls.key_path.exists() {
        return Err(format!(
            "TLS private key file not found: {}",
            tls.key_path.display()
        ));
    }

    Ok(())
}

/// Validate that `value` is an absolute http(s) URL with a host
pub fn validate_http_url(name: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("{name} is not a valid URL '{value}': {e}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "{name} must use http or https, got '{}'",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err(format!("{name} must include a host"));
    }

    Ok(())
}
