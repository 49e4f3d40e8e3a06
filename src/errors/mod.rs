//! Error types returned by handlers and the call initiation path

pub mod app_error;
