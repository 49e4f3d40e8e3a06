use std::path::PathBuf;

use super::env::load_from_env;
use super::utils::non_empty;
use super::yaml::{TlsYaml, YamlConfig};
use super::{ServerConfig, TlsConfig};

/// Merge environment configuration (base) with optional YAML overrides
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = load_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = non_empty(server.host) {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            config.tls = merge_tls(tls)?;
        }
    }

    if let Some(url) = non_empty(yaml.public_base_url) {
        config.public_base_url = Some(url);
    }

    if let Some(twilio) = yaml.twilio {
        if let Some(sid) = non_empty(twilio.account_sid) {
            config.twilio_account_sid = Some(sid);
        }
        if let Some(token) = non_empty(twilio.auth_token) {
            config.twilio_auth_token = Some(token);
        }
        if let Some(number) = non_empty(twilio.from_number) {
            config.twilio_from_number = Some(number);
        }
        if let Some(url) = non_empty(twilio.api_base_url) {
            config.twilio_api_base_url = url;
        }
        if let Some(mode) = twilio.machine_detection {
            config.twilio_machine_detection = non_empty(Some(mode));
        }
        if let Some(timeout) = twilio.timeout_seconds {
            config.twilio_timeout_seconds = timeout;
        }
    }

    if let Some(uri) = yaml.livekit.and_then(|livekit| non_empty(livekit.sip_uri)) {
        config.livekit_sip_uri = Some(uri);
    }

    if let Some(security) = yaml.security {
        if let Some(origins) = non_empty(security.cors_allowed_origins) {
            config.cors_allowed_origins = Some(origins);
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}

fn merge_tls(tls: TlsYaml) -> Result<Option<TlsConfig>, String> {
    let cert = non_empty(tls.cert_path);
    let key = non_empty(tls.key_path);
    let enabled = tls.enabled.unwrap_or(cert.is_some() || key.is_some());

    if !enabled {
        return Ok(None);
    }

    match (cert, key) {
        (Some(cert), Some(key)) => Ok(Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        })),
        _ => Err("TLS is enabled but server.tls.cert_path and server.tls.key_path are not both set"
            .to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_tls_disabled() {
        let tls = TlsYaml {
            enabled: Some(false),
            cert_path: Some("/cert.pem".to_string()),
            key_path: Some("/key.pem".to_string()),
        };
        assert_eq!(merge_tls(tls).unwrap(), None);
    }

    #[test]
    fn test_merge_tls_implicitly_enabled_by_paths() {
        let tls = TlsYaml {
            enabled: None,
            cert_path: Some("/cert.pem".to_string()),
            key_path: Some("/key.pem".to_string()),
        };
        let merged = merge_tls(tls).unwrap().unwrap();
        assert_eq!(merged.cert_path, PathBuf::from("/cert.pem"));
        assert_eq!(merged.key_path, PathBuf::from("/key.pem"));
    }

    #[test]
    fn test_merge_tls_enabled_without_key() {
        let tls = TlsYaml {
            enabled: Some(true),
            cert_path: Some("/cert.pem".to_string()),
            key_path: None,
        };
        assert!(merge_tls(tls).is_err());
    }
}
