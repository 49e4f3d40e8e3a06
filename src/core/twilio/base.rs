use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a [`CallOriginator`]
#[derive(Debug, Error)]
pub enum TwilioError {
    /// The client could not be constructed
    #[error("Invalid Twilio client configuration: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...)
    #[error("Request to Twilio failed: {0}")]
    Network(String),

    /// Twilio answered with a non-success status
    #[error("HTTP {status}{}: {message}", format_code(.code))]
    Api {
        status: u16,
        code: Option<u32>,
        message: String,
    },

    /// Twilio answered 2xx with a body that could not be understood
    #[error("Unexpected response from Twilio: {0}")]
    InvalidResponse(String),
}

fn format_code(code: &Option<u32>) -> String {
    code.map(|code| format!(" (code {code})")).unwrap_or_default()
}

/// Parameters of a single outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    /// Destination number (E.164)
    pub to: String,
    /// Caller ID (E.164)
    pub from: String,
    /// URL Twilio fetches TwiML from once the call connects
    pub callback_url: String,
    /// Answering machine detection mode, omitted when `None`
    pub machine_detection: Option<String>,
}

/// Anything that can ask a telephony provider to place a call
///
/// Implemented by [`super::TwilioClient`]; tests substitute their own.
#[async_trait]
pub trait CallOriginator: Send + Sync {
    /// Place the call and return the provider-assigned call identifier
    async fn originate(&self, call: OutboundCall) -> Result<String, TwilioError>;
}
