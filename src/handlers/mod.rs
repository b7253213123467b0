//! HTTP and WebSocket request handlers
//!
//! - `api` - Client page, client script and health check
//! - `session` - WebSocket audio transcription and translation sessions

pub mod api;
pub mod session;

// Re-export commonly used handlers for convenient access
pub use session::session_handler;
