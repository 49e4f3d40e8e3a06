//! Configuration module for the Twilio SIP bridge
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! Missing Twilio or LiveKit settings are tolerated at load time so that `/health`
//! stays reachable; the call and TwiML endpoints report them per request instead.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use twilio_sip_bridge::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port
pub const DEFAULT_PORT: u16 = 8001;
/// Base URL of the Twilio REST API
pub const DEFAULT_TWILIO_API_BASE_URL: &str = "https://api.twilio.com";
/// Answering machine detection mode sent with outbound calls
pub const DEFAULT_MACHINE_DETECTION: &str = "Enable";
/// Timeout applied to Twilio REST requests
pub const DEFAULT_TWILIO_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_RATE_LIMIT_REQUESTS_PER_SECOND: u32 = 60;
pub const DEFAULT_RATE_LIMIT_BURST_SIZE: u32 = 10;

// Environment variable names of the settings required to place and bridge calls.
pub const TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const TWILIO_FROM_NUMBER: &str = "TWILIO_FROM_NUMBER";
pub const PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
pub const LIVEKIT_SIP_URI: &str = "LIVEKIT_SIP_URI";

/// TLS configuration for HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the bridge:
/// - Server settings (host, port, TLS)
/// - Twilio credentials, caller ID and REST API settings
/// - The public base URL Twilio uses to reach this service
/// - The LiveKit SIP URI calls are dialed into
/// - Security settings (CORS, rate limiting)
#[derive(Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Twilio settings
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    /// Caller ID for outbound calls, E.164 format (e.g. "+15551234567")
    pub twilio_from_number: Option<String>,
    /// Base URL of the Twilio REST API, overridable for testing
    pub twilio_api_base_url: String,
    /// `MachineDetection` parameter for outbound calls. `None` omits it.
    pub twilio_machine_detection: Option<String>,
    pub twilio_timeout_seconds: u64,

    /// Externally reachable URL of this service (e.g. an ngrok tunnel)
    pub public_base_url: Option<String>,

    /// LiveKit SIP ingress URI, e.g. `sip:agent@your-domain.sip.livekit.cloud`
    pub livekit_sip_uri: Option<String>,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: None,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
            twilio_api_base_url: DEFAULT_TWILIO_API_BASE_URL.to_string(),
            twilio_machine_detection: Some(DEFAULT_MACHINE_DETECTION.to_string()),
            twilio_timeout_seconds: DEFAULT_TWILIO_TIMEOUT_SECONDS,
            public_base_url: None,
            livekit_sip_uri: None,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: DEFAULT_RATE_LIMIT_REQUESTS_PER_SECOND,
            rate_limit_burst_size: DEFAULT_RATE_LIMIT_BURST_SIZE,
        }
    }
}

/// Zeroize the auth token when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut token) = self.twilio_auth_token {
            token.zeroize();
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field(
                "twilio_auth_token",
                &self.twilio_auth_token.as_ref().map(|_| "<redacted>"),
            )
            .field("twilio_from_number", &self.twilio_from_number)
            .field("twilio_api_base_url", &self.twilio_api_base_url)
            .field("twilio_machine_detection", &self.twilio_machine_detection)
            .field("twilio_timeout_seconds", &self.twilio_timeout_seconds)
            .field("public_base_url", &self.public_base_url)
            .field("livekit_sip_uri", &self.livekit_sip_uri)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field(
                "rate_limit_requests_per_second",
                &self.rate_limit_requests_per_second,
            )
            .field("rate_limit_burst_size", &self.rate_limit_burst_size)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// The `.env` file is loaded in `main.rs` before this is called, so its values are
    /// visible here as regular environment variables.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Get the server address as a string in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Whether Twilio credentials are present, i.e. a REST client can be built
    pub fn twilio_ready(&self) -> bool {
        self.twilio_account_sid.is_some() && self.twilio_auth_token.is_some()
    }

    /// Names of the settings that are required to place an outbound call but unset
    ///
    /// Returned in a stable order; empty when the bridge is fully configured.
    pub fn missing_call_settings(&self) -> Vec<&'static str> {
        [
            (TWILIO_ACCOUNT_SID, self.twilio_account_sid.is_some()),
            (TWILIO_AUTH_TOKEN, self.twilio_auth_token.is_some()),
            (TWILIO_FROM_NUMBER, self.twilio_from_number.is_some()),
            (PUBLIC_BASE_URL, self.public_base_url.is_some()),
            (LIVEKIT_SIP_URI, self.livekit_sip_uri.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| (!present).then_some(name))
        .collect()
    }

    /// Public base URL without trailing slashes, ready to have paths appended
    pub fn callback_base_url(&self) -> Option<&str> {
        self.public_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn configured() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.twilio_account_sid = Some("AC123".to_string());
        config.twilio_auth_token = Some("token".to_string());
        config.twilio_from_number = Some("+15551234567".to_string());
        config.public_base_url = Some("https://bridge.example.com/".to_string());
        config.livekit_sip_uri = Some("sip:agent@example.sip.livekit.cloud".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "0.0.0.0:8001");
        assert!(!config.is_tls_enabled());
        assert!(!config.twilio_ready());
        assert_eq!(config.twilio_api_base_url, "https://api.twilio.com");
        assert_eq!(config.twilio_machine_detection.as_deref(), Some("Enable"));
    }

    #[test]
    fn test_missing_call_settings_lists_all_when_unset() {
        let config = ServerConfig::default();
        assert_eq!(
            config.missing_call_settings(),
            vec![
                "TWILIO_ACCOUNT_SID",
                "TWILIO_AUTH_TOKEN",
                "TWILIO_FROM_NUMBER",
                "PUBLIC_BASE_URL",
                "LIVEKIT_SIP_URI",
            ]
        );
    }

    #[test]
    fn test_missing_call_settings_only_sip_uri() {
        let mut config = configured();
        config.livekit_sip_uri = None;
        assert_eq!(config.missing_call_settings(), vec!["LIVEKIT_SIP_URI"]);
        assert!(config.twilio_ready());
    }

    #[test]
    fn test_fully_configured() {
        let config = configured();
        assert!(config.missing_call_settings().is_empty());
        assert!(config.twilio_ready());
    }

    #[test]
    fn test_callback_base_url_strips_trailing_slashes() {
        let mut config = configured();
        assert_eq!(
            config.callback_base_url(),
            Some("https://bridge.example.com")
        );
        config.public_base_url = Some("https://bridge.example.com//".to_string());
        assert_eq!(
            config.callback_base_url(),
            Some("https://bridge.example.com")
        );
        config.public_base_url = None;
        assert_eq!(config.callback_base_url(), None);
    }

    #[test]
    fn test_debug_redacts_auth_token() {
        let config = configured();
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("\"token\""));
    }

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("TLS_ENABLED");
            env::remove_var("TLS_CERT_PATH");
            env::remove_var("TLS_KEY_PATH");
            env::remove_var("TWILIO_ACCOUNT_SID");
            env::remove_var("TWILIO_AUTH_TOKEN");
            env::remove_var("TWILIO_FROM_NUMBER");
            env::remove_var("TWILIO_API_BASE_URL");
            env::remove_var("TWILIO_MACHINE_DETECTION");
            env::remove_var("TWILIO_TIMEOUT_SECONDS");
            env::remove_var("PUBLIC_BASE_URL");
            env::remove_var("LIVEKIT_SIP_URI");
            env::remove_var("CORS_ALLOWED_ORIGINS");
            env::remove_var("RATE_LIMIT_REQUESTS_PER_SECOND");
            env::remove_var("RATE_LIMIT_BURST_SIZE");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_without_variables_uses_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.twilio_account_sid.is_none());
        assert!(config.livekit_sip_uri.is_none());
        assert_eq!(config.missing_call_settings().len(), 5);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_reads_twilio_settings() {
        cleanup_env_vars();

        unsafe {
            env::set_var("PORT", "9100");
            env::set_var("TWILIO_ACCOUNT_SID", "AC-env");
            env::set_var("TWILIO_AUTH_TOKEN", "env-token");
            env::set_var("TWILIO_FROM_NUMBER", "+15550001111");
            env::set_var("PUBLIC_BASE_URL", "https://env.example.com");
            env::set_var("LIVEKIT_SIP_URI", "sip:agent@env.sip.livekit.cloud");
            env::set_var("TWILIO_MACHINE_DETECTION", "");
        }

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.twilio_account_sid.as_deref(), Some("AC-env"));
        assert_eq!(config.twilio_auth_token.as_deref(), Some("env-token"));
        assert_eq!(config.twilio_from_number.as_deref(), Some("+15550001111"));
        assert_eq!(
            config.livekit_sip_uri.as_deref(),
            Some("sip:agent@env.sip.livekit.cloud")
        );
        assert!(config.twilio_machine_detection.is_none());
        assert!(config.missing_call_settings().is_empty());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_treats_empty_values_as_unset() {
        cleanup_env_vars();

        unsafe {
            env::set_var("TWILIO_ACCOUNT_SID", "");
            env::set_var("LIVEKIT_SIP_URI", "   ");
        }

        let config = ServerConfig::from_env().unwrap();
        assert!(config.twilio_account_sid.is_none());
        assert!(config.livekit_sip_uri.is_none());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        cleanup_env_vars();

        unsafe {
            env::set_var("PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_public_base_url() {
        cleanup_env_vars();

        unsafe {
            env::set_var("PUBLIC_BASE_URL", "bridge.example.com");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PUBLIC_BASE_URL"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 8080

twilio:
  from_number: "+15559998888"

livekit:
  sip_uri: "sip:yaml@example.sip.livekit.cloud"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            env::set_var("HOST", "0.0.0.0");
            env::set_var("TWILIO_FROM_NUMBER", "+15550000000");
            env::set_var("TWILIO_ACCOUNT_SID", "AC-env");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.twilio_from_number.as_deref(), Some("+15559998888"));
        assert_eq!(
            config.livekit_sip_uri.as_deref(),
            Some("sip:yaml@example.sip.livekit.cloud")
        );
        // ENV value kept where YAML is silent
        assert_eq!(config.twilio_account_sid.as_deref(), Some("AC-env"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let config_path = PathBuf::from("/nonexistent/config.yaml");
        let result = ServerConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_tls_with_missing_files_fails_validation() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  tls:
    enabled: true
    cert_path: "/nonexistent/cert.pem"
    key_path: "/nonexistent/key.pem"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let result = ServerConfig::from_file(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TLS"));

        cleanup_env_vars();
    }
}
