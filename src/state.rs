use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::twilio::{CallOriginator, TwilioClient, TwilioError};

/// Application state shared by all handlers
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: ServerConfig,
    /// Present only when Twilio credentials are configured
    pub call_originator: Option<Arc<dyn CallOriginator>>,
}

impl AppState {
    /// Build state from configuration, creating the Twilio client when possible
    ///
    /// Missing credentials leave outbound calls disabled. Credentials that are set
    /// but cannot produce a client are an error.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, TwilioError> {
        let call_originator: Option<Arc<dyn CallOriginator>> =
            match TwilioClient::from_config(&config)? {
                Some(client) => {
                    info!("Twilio client initialized for account {}", client.account_sid());
                    Some(Arc::new(client))
                }
                None => {
                    warn!("Twilio credentials not configured; outbound calls are disabled");
                    None
                }
            };

        Ok(Self::with_originator(config, call_originator))
    }

    /// Build state with an explicit call originator
    pub fn with_originator(
        config: ServerConfig,
        call_originator: Option<Arc<dyn CallOriginator>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            call_originator,
        })
    }

    /// Whether a provider client is available
    pub fn twilio_ready(&self) -> bool {
        self.call_originator.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.twilio_account_sid = Some("AC123".to_string());
        config.twilio_auth_token = Some("token".to_string());
        config
    }

    #[test]
    fn test_new_without_credentials_disables_calls() {
        let state = AppState::new(ServerConfig::default()).unwrap();
        assert!(!state.twilio_ready());
    }

    #[test]
    fn test_new_with_credentials_builds_client() {
        let state = AppState::new(credentials_config()).unwrap();
        assert!(state.twilio_ready());
    }

    #[test]
    fn test_new_fails_when_client_cannot_be_built() {
        let mut config = credentials_config();
        config.twilio_api_base_url = "not a url".to_string();

        let err = AppState::new(config).err().unwrap();
        assert!(matches!(err, TwilioError::Configuration(_)));
    }
}
