//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `calls` - Outbound call initiation
//! - `twiml` - Twilio voice webhook returning the LiveKit SIP dial directive

pub mod api;
pub mod calls;
pub mod twiml;

// Re-export commonly used handlers for convenient access
pub use api::health_check;
pub use calls::start_call;
pub use twiml::serve_twiml;
