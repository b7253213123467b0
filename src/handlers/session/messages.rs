//! Session WebSocket message types
//!
//! Every frame in either direction is a JSON text frame shaped as
//! `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted size of a base64 audio field (10 MB)
pub const MAX_AUDIO_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

// =============================================================================
// Incoming Messages (Client -> Server)
// =============================================================================

/// Incoming WebSocket messages from client
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum IncomingMessage {
    /// One full recording to transcribe and translate
    CompleteAudioData {
        /// Base64 LINEAR16 audio at 16 kHz
        audio: String,
        /// Recording length reported by the client, in milliseconds. Only
        /// logged, so any JSON value is accepted.
        #[serde(default)]
        duration: serde_json::Value,
    },

    /// Legacy single chunk
    AudioData {
        /// Base64 LINEAR16 audio at 16 kHz
        audio: String,
    },
}

impl IncomingMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            IncomingMessage::CompleteAudioData { .. } => "complete_audio_data",
            IncomingMessage::AudioData { .. } => "audio_data",
        }
    }

    /// Validate user-provided content against size limits
    pub fn validate_size(&self) -> Result<(), ValidationError> {
        let audio = match self {
            IncomingMessage::CompleteAudioData { audio, .. } | IncomingMessage::AudioData { audio } => {
                audio
            }
        };

        let size = audio.len();
        if size > MAX_AUDIO_PAYLOAD_SIZE {
            return Err(ValidationError::AudioTooLarge {
                size,
                max: MAX_AUDIO_PAYLOAD_SIZE,
            });
        }
        Ok(())
    }
}

/// Incoming message validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Audio too long. Please record a shorter message.")]
    AudioTooLarge { size: usize, max: usize },
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Outgoing WebSocket messages to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutgoingMessage {
    /// Connection acknowledgment
    Status {
        message: String,
        /// Signed session token, usable as `?session=` on reconnect
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },

    /// Progress notice, possibly with partial data
    InterimResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translation: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Final result of one request
    TranscriptionResult {
        transcript: String,
        /// Translated text, or a "Translation error: ..." description
        translation: String,
        confidence: f32,
        /// Omitted by the legacy chunk flow
        #[serde(default, skip_serializing_if = "Option::is_none")]
        low_confidence: Option<bool>,
    },

    /// Failure notice; the session stays open
    Error { message: String },
}

impl OutgoingMessage {
    pub fn status(message: impl Into<String>, session_id: Option<String>) -> Self {
        OutgoingMessage::Status {
            message: message.into(),
            session_id,
        }
    }

    /// Interim event carrying only a notice.
    pub fn progress(message: impl Into<String>) -> Self {
        OutgoingMessage::InterimResult {
            transcript: None,
            translation: None,
            message: Some(message.into()),
        }
    }

    /// Interim event for an empty result: blank transcript and translation.
    pub fn empty_result(message: impl Into<String>) -> Self {
        OutgoingMessage::InterimResult {
            transcript: Some(String::new()),
            translation: Some(String::new()),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        OutgoingMessage::Error {
            message: message.into(),
        }
    }
}

/// Message routing for the writer task
#[derive(Debug)]
pub enum MessageRoute {
    Outgoing(OutgoingMessage),
    Close,
}
