//! Session WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::session::session_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the session WebSocket router
///
/// # Endpoint
///
/// `GET /ws[?session=<token>]` - WebSocket upgrade
///
/// # Example
///
/// ```json
/// // Server greets the client
/// {"event": "status", "data": {"message": "Connected to server", "session_id": "<token>"}}
///
/// // Client sends a recording
/// {"event": "complete_audio_data", "data": {"audio": "<base64 LINEAR16>", "duration": 3200}}
///
/// // Server reports progress, then the result
/// {"event": "interim_result", "data": {"message": "Processing audio..."}}
/// {"event": "interim_result", "data": {"transcript": "नमस्ते", "message": "Translating..."}}
/// {"event": "transcription_result", "data": {"transcript": "नमस्ते", "translation": "Hello", "confidence": 0.92, "low_confidence": false}}
/// ```
///
/// The handler reads the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_session_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(session_handler))
        .layer(TraceLayer::new_for_http())
}
