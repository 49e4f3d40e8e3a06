use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;
use zeroize::Zeroizing;

use super::base::{CallOriginator, OutboundCall, TwilioError};
use super::messages::{CallResource, CreateCallParams, TwilioErrorResponse};
use crate::config::ServerConfig;

/// Twilio REST API version segment
pub const TWILIO_API_VERSION: &str = "2010-04-01";

/// Minimal Twilio REST client covering call creation
pub struct TwilioClient {
    http_client: Client,
    api_base_url: String,
    account_sid: String,
    auth_token: Zeroizing<String>,
}

impl fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioClient")
            .field("api_base_url", &self.api_base_url)
            .field("account_sid", &self.account_sid)
            .finish_non_exhaustive()
    }
}

impl TwilioClient {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TwilioError> {
        let api_base_url = api_base_url.into();
        let parsed = Url::parse(&api_base_url).map_err(|e| {
            TwilioError::Configuration(format!("Invalid API base URL '{api_base_url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TwilioError::Configuration(format!(
                "API base URL must use http or https: {api_base_url}"
            )));
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TwilioError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token: Zeroizing::new(auth_token.into()),
        })
    }

    /// Build a client when both Twilio credentials are configured
    ///
    /// Returns `Ok(None)` when either credential is unset.
    pub fn from_config(config: &ServerConfig) -> Result<Option<Self>, TwilioError> {
        let (Some(sid), Some(token)) = (
            config.twilio_account_sid.as_deref(),
            config.twilio_auth_token.as_deref(),
        ) else {
            return Ok(None);
        };

        Self::new(
            sid,
            token,
            config.twilio_api_base_url.as_str(),
            Duration::from_secs(config.twilio_timeout_seconds),
        )
        .map(Some)
    }

    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    /// URL of the account's `Calls` collection
    pub fn calls_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}/Calls.json",
            self.api_base_url, TWILIO_API_VERSION, self.account_sid
        )
    }

    /// Create an outbound call
    pub async fn create_call(
        &self,
        params: &CreateCallParams<'_>,
    ) -> Result<CallResource, TwilioError> {
        debug!("Creating Twilio call to {} via {}", params.to, params.url);

        let response = self
            .http_client
            .post(self.calls_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.as_str()))
            .form(params)
            .send()
            .await
            .map_err(|e| TwilioError::Network(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| TwilioError::Network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let mut more_info = None;
            let error = match serde_json::from_str::<TwilioErrorResponse>(&response_text) {
                Ok(body) => {
                    more_info = body.more_info;
                    TwilioError::Api {
                        status: body.status.unwrap_or(status.as_u16()),
                        code: body.code,
                        message: body.message,
                    }
                }
                Err(_) => TwilioError::Api {
                    status: status.as_u16(),
                    code: None,
                    message: if response_text.trim().is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string()
                    } else {
                        response_text
                    },
                },
            };
            warn!(
                "Twilio rejected call to {}: {} (more info: {})",
                params.to,
                error,
                more_info.as_deref().unwrap_or("-")
            );
            return Err(error);
        }

        let call: CallResource = serde_json::from_str(&response_text)
            .map_err(|e| TwilioError::InvalidResponse(e.to_string()))?;

        info!(
            "Twilio call created - call_sid={}, status={}",
            call.sid,
            call.status.as_deref().unwrap_or("unknown")
        );

        Ok(call)
    }
}

#[async_trait]
impl CallOriginator for TwilioClient {
    async fn originate(&self, call: OutboundCall) -> Result<String, TwilioError> {
        let params = CreateCallParams {
            to: &call.to,
            from: &call.from,
            url: &call.callback_url,
            machine_detection: call.machine_detection.as_deref(),
        };
        self.create_call(&params).await.map(|resource| resource.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calls_url() {
        let client = TwilioClient::new(
            "AC123",
            "token",
            "https://api.twilio.com/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.calls_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Calls.json"
        );
    }

    #[test]
    fn test_from_config_requires_both_credentials() {
        let mut config = ServerConfig::default();
        assert!(TwilioClient::from_config(&config).unwrap().is_none());

        config.twilio_account_sid = Some("AC123".to_string());
        assert!(TwilioClient::from_config(&config).unwrap().is_none());

        config.twilio_auth_token = Some("token".to_string());
        let client = TwilioClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.account_sid(), "AC123");
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let err = TwilioClient::new("AC123", "token", "not a url", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, TwilioError::Configuration(_)));

        let err = TwilioClient::new("AC123", "token", "ftp://api.twilio.com", Duration::from_secs(5))
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_debug_hides_auth_token() {
        let client =
            TwilioClient::new("AC123", "super-secret", "https://api.twilio.com", Duration::from_secs(5))
                .unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }
}
