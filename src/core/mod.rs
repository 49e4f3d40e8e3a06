pub mod call_initiator;
pub mod call_router;
pub mod twilio;
pub mod twiml;

// Re-export commonly used types for convenience
pub use call_initiator::{
    CallInitiated, DEFAULT_OUTBOUND_ROOM, OutboundCallRequest, initiate_call, twiml_callback_url,
};
pub use call_router::{
    CallEvent, CallMethod, DEFAULT_ROOM, INBOUND_ROOM_PREFIX, RoomSource, RoutedCall,
    normalize_caller_number, route_call,
};
pub use twilio::{CallOriginator, OutboundCall, TwilioClient, TwilioError};
pub use twiml::{TWIML_CONTENT_TYPE, dial_sip};
