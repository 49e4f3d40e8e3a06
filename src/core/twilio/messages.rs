//! Wire types for Twilio's `Calls` REST resource.

use serde::{Deserialize, Serialize};

/// Form body of `POST /2010-04-01/Accounts/{AccountSid}/Calls.json`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateCallParams<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_detection: Option<&'a str>,
}

/// Subset of the Call resource returned on creation
#[derive(Debug, Clone, Deserialize)]
pub struct CallResource {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error body Twilio returns with 4xx/5xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioErrorResponse {
    #[serde(default)]
    pub code: Option<u32>,
    pub message: String,
    #[serde(default)]
    pub more_info: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}
