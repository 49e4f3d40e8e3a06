//! Twilio telephony provider module.
//!
//! Places outbound calls through Twilio's Programmable Voice REST API.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.twilio.com/2010-04-01/Accounts/{AccountSid}/Calls.json`
//! - Auth: HTTP basic, account SID and auth token
//! - Body: `application/x-www-form-urlencoded` (`To`, `From`, `Url`, `MachineDetection`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use twilio_sip_bridge::core::twilio::{CallOriginator, OutboundCall, TwilioClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TwilioClient::new("AC...", "auth-token", "https://api.twilio.com", Duration::from_secs(15))?;
//! let call_sid = client
//!     .originate(OutboundCall {
//!         to: "+15557654321".to_string(),
//!         from: "+15551234567".to_string(),
//!         callback_url: "https://bridge.example.com/twiml?room=demo-room".to_string(),
//!         machine_detection: Some("Enable".to_string()),
//!     })
//!     .await?;
//! println!("Started call {call_sid}");
//! # Ok(())
//! # }
//! ```

mod base;
mod client;
mod messages;

pub use base::{CallOriginator, OutboundCall, TwilioError};
pub use client::{TWILIO_API_VERSION, TwilioClient};
pub use messages::{CallResource, CreateCallParams, TwilioErrorResponse};
