//! TwiML rendering
//!
//! The only directive this service emits tells Twilio to bridge the call into the
//! LiveKit SIP ingress:
//!
//! ```text
//! <Response>
//!   <Dial>
//!     <Sip>sip:agent@your-domain.sip.livekit.cloud</Sip>
//!   </Dial>
//! </Response>
//! ```

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// Content type of TwiML responses
pub const TWIML_CONTENT_TYPE: &str = "application/xml";

/// Render a `<Dial><Sip>` directive for the given SIP URI
///
/// The URI is XML-escaped, so URIs carrying query strings such as
/// `?lk_r=room&lk_t=token` still produce a well-formed document.
pub fn dial_sip(sip_uri: &str) -> Result<String, String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    for tag in ["Response", "Dial", "Sip"] {
        writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(|e| format!("Failed to write <{tag}>: {e}"))?;
    }
    writer
        .write_event(Event::Text(BytesText::new(sip_uri)))
        .map_err(|e| format!("Failed to write SIP URI: {e}"))?;
    for tag in ["Sip", "Dial", "Response"] {
        writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(|e| format!("Failed to write </{tag}>: {e}"))?;
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| format!("TwiML is not valid UTF-8: {e}"))
}
