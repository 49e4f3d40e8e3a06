//! Call routing for Twilio voice webhooks
//!
//! Twilio requests the same webhook for inbound calls (someone dials the Twilio
//! number) and outbound calls (placed through `/call`, which appends `?room=...` to
//! the callback URL). Each request is reduced to a [`CallEvent`] and mapped to the
//! room the call should join:
//!
//! 1. a non-empty `room` query parameter is used verbatim;
//! 2. otherwise a POST carrying a `From` form field yields `inbound-<digits>`;
//! 3. otherwise the call lands in [`DEFAULT_ROOM`].
//!
//! Form decoding problems never fail the request; they fall through to the default.

use std::collections::HashMap;

use http::Method;
use tracing::debug;

/// Room used when neither an explicit room nor a caller number is available
pub const DEFAULT_ROOM: &str = "agent-room";

/// Prefix of rooms derived from an inbound caller's number
pub const INBOUND_ROOM_PREFIX: &str = "inbound-";

const ROOM_PARAM: &str = "room";
const CALLER_PARAM: &str = "From";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method of a webhook request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallMethod {
    #[default]
    Get,
    Post,
}

impl From<&Method> for CallMethod {
    fn from(method: &Method) -> Self {
        if *method == Method::POST {
            CallMethod::Post
        } else {
            CallMethod::Get
        }
    }
}

/// Normalized view of a single webhook request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallEvent {
    pub method: CallMethod,
    pub query_params: HashMap<String, String>,
    /// Decoded form body; always empty for GET requests
    pub form_params: HashMap<String, String>,
}

/// Where a routed room name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSource {
    /// `room` query parameter, set by `/call` for outbound calls
    Explicit,
    /// Derived from the inbound caller's number
    Caller,
    /// Nothing usable in the request
    Default,
}

/// Result of routing a [`CallEvent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedCall {
    pub room: String,
    pub source: RoomSource,
}

impl CallEvent {
    pub fn new(method: CallMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn with_form_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_params.insert(key.into(), value.into());
        self
    }

    /// Build an event from the raw parts of an HTTP request
    ///
    /// The body is only decoded for POST requests with a
    /// `application/x-www-form-urlencoded` content type, which is what Twilio
    /// sends. Anything else, `multipart/form-data` included, leaves `form_params`
    /// empty.
    pub fn from_request_parts(
        method: &Method,
        query: Option<&str>,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Self {
        let method = CallMethod::from(method);
        let query_params = query.map(parse_urlencoded).unwrap_or_default();

        let form_params = match method {
            CallMethod::Post if is_form_content_type(content_type) => parse_urlencoded(body),
            CallMethod::Post => {
                if !body.is_empty() {
                    debug!(
                        "Ignoring webhook body with unsupported content type: {:?}",
                        content_type
                    );
                }
                HashMap::new()
            }
            CallMethod::Get => HashMap::new(),
        };

        Self {
            method,
            query_params,
            form_params,
        }
    }

    /// Non-empty `room` query parameter, if any
    pub fn explicit_room(&self) -> Option<&str> {
        self.query_params
            .get(ROOM_PARAM)
            .map(String::as_str)
            .filter(|room| !room.is_empty())
    }

    /// Caller number posted by Twilio, if any
    pub fn caller(&self) -> Option<&str> {
        match self.method {
            CallMethod::Post => self.form_params.get(CALLER_PARAM).map(String::as_str),
            CallMethod::Get => None,
        }
    }

    /// Arbitrary form field, e.g. `CallSid` or `Direction`
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form_params.get(key).map(String::as_str)
    }
}

/// Remove `+` signs and spaces from a caller number
pub fn normalize_caller_number(raw: &str) -> String {
    raw.replace(['+', ' '], "")
}

/// Select the room a call should join
pub fn route_call(event: &CallEvent) -> RoutedCall {
    if let Some(room) = event.explicit_room() {
        return RoutedCall {
            room: room.to_string(),
            source: RoomSource::Explicit,
        };
    }

    if let Some(caller) = event.caller() {
        let normalized = normalize_caller_number(caller);
        if !normalized.is_empty() {
            return RoutedCall {
                room: format!("{INBOUND_ROOM_PREFIX}{normalized}"),
                source: RoomSource::Caller,
            };
        }
    }

    RoutedCall {
        room: DEFAULT_ROOM.to_string(),
        source: RoomSource::Default,
    }
}

fn is_form_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

// Later duplicate keys overwrite earlier ones.
fn parse_urlencoded(input: impl AsRef<[u8]>) -> HashMap<String, String> {
    url::form_urlencoded::parse(input.as_ref())
        .into_owned()
        .collect()
}
