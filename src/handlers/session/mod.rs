//! Session WebSocket: the audio-to-transcript protocol.
//!
//! # Protocol
//!
//! Client → server:
//!
//! ```json
//! {"event": "complete_audio_data", "data": {"audio": "<base64>", "duration": 3200}}
//! {"event": "audio_data", "data": {"audio": "<base64>"}}
//! ```
//!
//! Server → client: `status`, `interim_result`, `transcription_result` and
//! `error`, see [`OutgoingMessage`].

mod handler;
mod messages;
mod pipeline;

pub use handler::{
    CONNECTED_MESSAGE, IDLE_MESSAGE, MAX_WS_FRAME_SIZE, MAX_WS_MESSAGE_SIZE, SessionParams,
    session_handler,
};
pub use messages::{
    IncomingMessage, MAX_AUDIO_PAYLOAD_SIZE, MessageRoute, OutgoingMessage, ValidationError,
};
pub use pipeline::{
    LEGACY_REJECT_THRESHOLD, LOW_CONFIDENCE_THRESHOLD, MIN_AUDIO_BYTES, MalformedAudioError,
    NOT_INITIALIZED_MESSAGE, SessionPipeline, decode_audio,
};
