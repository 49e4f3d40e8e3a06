//! Outbound call initiation
//!
//! Validates that the bridge is fully configured, then asks the telephony provider
//! to dial the destination and fetch its instructions from our own `/twiml`
//! webhook, tagged with the room the call belongs to.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ServerConfig, TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN};
use crate::core::twilio::{CallOriginator, OutboundCall};
use crate::errors::app_error::{AppError, AppResult};

/// Room used for outbound calls when the requester does not name one
pub const DEFAULT_OUTBOUND_ROOM: &str = "demo-room";

/// Body of `POST /call`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutboundCallRequest {
    /// E.164 destination number, e.g. `+15557654321`
    pub to: String,
    /// Optional LiveKit room, forwarded to `/twiml` as a query parameter
    #[serde(default)]
    pub room: Option<String>,
}

impl OutboundCallRequest {
    /// Requested room, or [`DEFAULT_OUTBOUND_ROOM`] when absent or empty
    pub fn room_or_default(&self) -> &str {
        self.room
            .as_deref()
            .filter(|room| !room.is_empty())
            .unwrap_or(DEFAULT_OUTBOUND_ROOM)
    }
}

/// Response of a successful `POST /call`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CallInitiated {
    pub status: String,
    pub call_sid: String,
}

impl CallInitiated {
    pub fn new(call_sid: impl Into<String>) -> Self {
        Self {
            status: "initiated".to_string(),
            call_sid: call_sid.into(),
        }
    }
}

/// URL Twilio fetches TwiML from for an outbound call into `room`
pub fn twiml_callback_url(base_url: &str, room: &str) -> String {
    let room: String = url::form_urlencoded::byte_serialize(room.as_bytes()).collect();
    format!("{}/twiml?room={}", base_url.trim_end_matches('/'), room)
}

/// Place an outbound call
///
/// Fails with [`AppError::Configuration`] before contacting the provider when any
/// required setting is missing, and with [`AppError::Provider`] when the provider
/// rejects the call. Nothing is retried.
pub async fn initiate_call(
    config: &ServerConfig,
    originator: Option<&dyn CallOriginator>,
    request: &OutboundCallRequest,
) -> AppResult<CallInitiated> {
    let mut missing = config.missing_call_settings();

    let (Some(originator), Some(from), Some(base_url)) = (
        originator,
        config.twilio_from_number.as_deref(),
        config.callback_base_url(),
    ) else {
        if originator.is_none() {
            for name in [TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN] {
                if !missing.contains(&name) {
                    missing.push(name);
                }
            }
        }
        return Err(AppError::configuration(missing));
    };

    if !missing.is_empty() {
        return Err(AppError::configuration(missing));
    }

    let room = request.room_or_default();
    let callback_url = twiml_callback_url(base_url, room);

    info!(
        "Initiating outbound call - to={}, room={}, callback={}",
        request.to, room, callback_url
    );

    let call_sid = originator
        .originate(OutboundCall {
            to: request.to.clone(),
            from: from.to_string(),
            callback_url,
            machine_detection: config.twilio_machine_detection.clone(),
        })
        .await?;

    info!("Outbound call initiated - call_sid={}, room={}", call_sid, room);

    Ok(CallInitiated::new(call_sid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::twilio::TwilioError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOriginator {
        calls: Mutex<Vec<OutboundCall>>,
        reject_with: Option<String>,
    }

    #[async_trait]
    impl CallOriginator for RecordingOriginator {
        async fn originate(&self, call: OutboundCall) -> Result<String, TwilioError> {
            self.calls.lock().unwrap().push(call);
            match &self.reject_with {
                Some(message) => Err(TwilioError::Api {
                    status: 400,
                    code: Some(21211),
                    message: message.clone(),
                }),
                None => Ok("CA-test".to_string()),
            }
        }
    }

    fn configured() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.twilio_account_sid = Some("AC123".to_string());
        config.twilio_auth_token = Some("token".to_string());
        config.twilio_from_number = Some("+15551234567".to_string());
        config.public_base_url = Some("https://bridge.example.com/".to_string());
        config.livekit_sip_uri = Some("sip:agent@example.sip.livekit.cloud".to_string());
        config
    }

    fn request(room: Option<&str>) -> OutboundCallRequest {
        OutboundCallRequest {
            to: "+15557654321".to_string(),
            room: room.map(str::to_string),
        }
    }

    #[test]
    fn test_twiml_callback_url() {
        assert_eq!(
            twiml_callback_url("https://bridge.example.com/", "demo-room"),
            "https://bridge.example.com/twiml?room=demo-room"
        );
        assert_eq!(
            twiml_callback_url("https://bridge.example.com", "sales & support"),
            "https://bridge.example.com/twiml?room=sales+%26+support"
        );
    }

    #[test]
    fn test_room_or_default() {
        assert_eq!(request(None).room_or_default(), "demo-room");
        assert_eq!(request(Some("")).room_or_default(), "demo-room");
        assert_eq!(request(Some("vip")).room_or_default(), "vip");
    }

    #[tokio::test]
    async fn test_initiate_call_uses_default_room() {
        let originator = RecordingOriginator::default();
        let result = initiate_call(&configured(), Some(&originator), &request(None))
            .await
            .unwrap();

        assert_eq!(result, CallInitiated::new("CA-test"));
        let calls = originator.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].callback_url,
            "https://bridge.example.com/twiml?room=demo-room"
        );
        assert_eq!(calls[0].to, "+15557654321");
        assert_eq!(calls[0].from, "+15551234567");
        assert_eq!(calls[0].machine_detection.as_deref(), Some("Enable"));
    }

    #[tokio::test]
    async fn test_initiate_call_with_room() {
        let originator = RecordingOriginator::default();
        initiate_call(&configured(), Some(&originator), &request(Some("vip-42")))
            .await
            .unwrap();

        let calls = originator.calls.lock().unwrap();
        assert_eq!(
            calls[0].callback_url,
            "https://bridge.example.com/twiml?room=vip-42"
        );
    }

    #[tokio::test]
    async fn test_missing_sip_uri_does_not_contact_provider() {
        let originator = RecordingOriginator::default();
        let mut config = configured();
        config.livekit_sip_uri = None;

        let err = initiate_call(&config, Some(&originator), &request(None))
            .await
            .unwrap_err();

        match err {
            AppError::Configuration { missing } => assert_eq!(missing, vec!["LIVEKIT_SIP_URI"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(originator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_originator_is_configuration_error() {
        let err = initiate_call(&configured(), None, &request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
        assert!(err.to_string().contains("TWILIO_ACCOUNT_SID"));
    }

    #[tokio::test]
    async fn test_provider_rejection_is_provider_error() {
        let originator = RecordingOriginator {
            reject_with: Some("The 'To' number is not a valid phone number.".to_string()),
            ..Default::default()
        };

        let err = initiate_call(&configured(), Some(&originator), &request(None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Provider(_)));
        assert!(err.to_string().contains("not a valid phone number"));
        assert_eq!(originator.calls.lock().unwrap().len(), 1);
    }
}
