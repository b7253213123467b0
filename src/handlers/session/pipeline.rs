//! Per-request processing: decode, recognize, translate, report.
//!
//! One [`SessionPipeline`] serves one session. It owns nothing mutable; the
//! backend handles are shared with every other session.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::LanguageConfig;
use crate::core::stt::{RecognitionProfile, recognize_with_fallback, summarize};
use crate::state::Backends;

use super::messages::{IncomingMessage, MessageRoute, OutgoingMessage};

/// Payloads shorter than this are treated as silence.
pub const MIN_AUDIO_BYTES: usize = 1000;

/// Averaged confidence below this is flagged as low.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.2;

/// Legacy chunks below this confidence are not translated.
pub const LEGACY_REJECT_THRESHOLD: f32 = 0.3;

pub const NOT_INITIALIZED_MESSAGE: &str = "Google Cloud services not initialized";
pub const TOO_SHORT_MESSAGE: &str = "No speech detected (recording too short)";
pub const NO_SPEECH_MESSAGE: &str = "No speech detected";
pub const PROCESSING_MESSAGE: &str = "Processing audio...";
pub const TRANSLATING_MESSAGE: &str = "Translating...";
pub const LOW_CONFIDENCE_MESSAGE: &str = "Low confidence - please speak clearly";

/// The audio field was not valid base64.
#[derive(Debug, Error)]
#[error("Invalid base64 audio: {0}")]
pub struct MalformedAudioError(#[from] base64::DecodeError);

pub fn decode_audio(audio: &str) -> Result<Vec<u8>, MalformedAudioError> {
    Ok(BASE64_STANDARD.decode(audio.trim())?)
}

/// Notice sent before retrying in the fallback language.
fn fallback_notice(language: &str) -> String {
    if language.starts_with("en") {
        "Trying with English...".to_string()
    } else {
        format!("Trying with {language}...")
    }
}

/// Queue an event for the writer task. A closed channel means the client is
/// gone; the event is dropped.
async fn emit(tx: &mpsc::Sender<MessageRoute>, message: OutgoingMessage) {
    if tx.send(MessageRoute::Outgoing(message)).await.is_err() {
        debug!("Session writer closed, dropping outgoing event");
    }
}

/// Runs the recognition and translation sequence for one session.
#[derive(Clone)]
pub struct SessionPipeline {
    backends: Option<Backends>,
    languages: LanguageConfig,
    primary: RecognitionProfile,
    fallback: RecognitionProfile,
    legacy: RecognitionProfile,
}

impl SessionPipeline {
    pub fn new(backends: Option<Backends>, languages: LanguageConfig) -> Self {
        Self {
            primary: RecognitionProfile::primary(&languages),
            fallback: RecognitionProfile::fallback(&languages),
            legacy: RecognitionProfile::legacy(&languages),
            backends,
            languages,
        }
    }

    /// Process one request to completion, emitting every event on `tx`.
    pub async fn handle(&self, request: IncomingMessage, tx: &mpsc::Sender<MessageRoute>) {
        match request {
            IncomingMessage::CompleteAudioData { audio, duration } => {
                self.handle_complete(&audio, &duration, tx).await
            }
            IncomingMessage::AudioData { audio } => self.handle_chunk(&audio, tx).await,
        }
    }

    /// Check availability and decode. `None` means an event was already sent.
    async fn prepare(&self, audio: &str, tx: &mpsc::Sender<MessageRoute>) -> Option<(&Backends, Vec<u8>)> {
        let Some(backends) = self.backends.as_ref() else {
            emit(tx, OutgoingMessage::error(NOT_INITIALIZED_MESSAGE)).await;
            return None;
        };

        match decode_audio(audio) {
            Ok(bytes) => Some((backends, bytes)),
            Err(e) => {
                error!("Error decoding audio: {e}");
                emit(tx, OutgoingMessage::error(format!("Error processing audio: {e}"))).await;
                None
            }
        }
    }

    async fn handle_complete(
        &self,
        audio: &str,
        duration_ms: &serde_json::Value,
        tx: &mpsc::Sender<MessageRoute>,
    ) {
        let Some((backends, audio)) = self.prepare(audio, tx).await else {
            return;
        };

        info!(
            bytes = audio.len(),
            duration_ms = %duration_ms, "Complete audio data received"
        );

        if audio.len() < MIN_AUDIO_BYTES {
            warn!(bytes = audio.len(), "Audio data too small, likely no speech");
            emit(tx, OutgoingMessage::empty_result(TOO_SHORT_MESSAGE)).await;
            return;
        }

        emit(tx, OutgoingMessage::progress(PROCESSING_MESSAGE)).await;

        let fallback_language = self.fallback.language_code.as_str();
        let recognition = recognize_with_fallback(
            backends.speech.as_ref(),
            &audio,
            &self.primary,
            Some(&self.fallback),
            move || async move {
                info!(
                    language = fallback_language,
                    "No results with primary language, retrying"
                );
                emit(tx, OutgoingMessage::progress(fallback_notice(fallback_language))).await;
            },
        )
        .await;

        let recognition = match recognition {
            Ok(recognition) => recognition,
            Err(e) => {
                error!(kind = ?e.kind, "Error processing complete audio: {}", e.message);
                emit(tx, OutgoingMessage::error(e.user_message())).await;
                return;
            }
        };

        let summary = summarize(&recognition.segments);
        if summary.segment_count == 0 {
            info!("No speech detected in the complete audio");
            emit(tx, OutgoingMessage::empty_result(NO_SPEECH_MESSAGE)).await;
            return;
        }

        let low_confidence = summary.confidence < LOW_CONFIDENCE_THRESHOLD;
        info!(
            transcript = %summary.transcript,
            confidence = summary.confidence,
            segments = summary.segment_count,
            language = %recognition.language_code,
            used_fallback = recognition.used_fallback,
            "Full transcript"
        );

        emit(
            tx,
            OutgoingMessage::InterimResult {
                transcript: Some(summary.transcript.clone()),
                translation: None,
                message: Some(TRANSLATING_MESSAGE.to_string()),
            },
        )
        .await;

        let translation = self.translate(backends, &summary.transcript).await;

        emit(
            tx,
            OutgoingMessage::TranscriptionResult {
                transcript: summary.transcript,
                translation,
                confidence: summary.confidence,
                low_confidence: Some(low_confidence),
            },
        )
        .await;
    }

    async fn handle_chunk(&self, audio: &str, tx: &mpsc::Sender<MessageRoute>) {
        let Some((backends, audio)) = self.prepare(audio, tx).await else {
            return;
        };

        info!(bytes = audio.len(), "Received legacy audio chunk");

        if audio.len() < MIN_AUDIO_BYTES {
            warn!(bytes = audio.len(), "Audio chunk too small, likely no speech");
            emit(tx, OutgoingMessage::empty_result(TOO_SHORT_MESSAGE)).await;
            return;
        }

        // Chunks get a single pass; the legacy profile already lists the
        // fallback language as an alternative.
        let recognition = recognize_with_fallback(
            backends.speech.as_ref(),
            &audio,
            &self.legacy,
            None,
            || async {},
        )
        .await;

        let segments = match recognition {
            Ok(recognition) => recognition.segments,
            Err(e) => {
                error!(kind = ?e.kind, "Error processing audio chunk: {}", e.message);
                emit(tx, OutgoingMessage::error(e.user_message())).await;
                return;
            }
        };

        let Some(best) = segments.first().and_then(|segment| segment.best()).cloned() else {
            info!("No speech detected in audio chunk");
            emit(tx, OutgoingMessage::empty_result(NO_SPEECH_MESSAGE)).await;
            return;
        };

        info!(
            transcript = %best.transcript,
            confidence = best.confidence,
            "Chunk transcript"
        );

        if best.confidence < LEGACY_REJECT_THRESHOLD {
            emit(
                tx,
                OutgoingMessage::InterimResult {
                    transcript: Some(best.transcript),
                    translation: Some(String::new()),
                    message: Some(LOW_CONFIDENCE_MESSAGE.to_string()),
                },
            )
            .await;
            return;
        }

        let translation = self.translate(backends, &best.transcript).await;

        emit(
            tx,
            OutgoingMessage::TranscriptionResult {
                transcript: best.transcript,
                translation,
                confidence: best.confidence,
                low_confidence: None,
            },
        )
        .await;
    }

    /// Translate, degrading a failure into a descriptive string.
    async fn translate(&self, backends: &Backends, transcript: &str) -> String {
        match backends
            .translator
            .translate(
                transcript,
                &self.languages.translation_source,
                &self.languages.translation_target,
            )
            .await
        {
            Ok(translation) => {
                info!(translation = %translation, "Translation");
                translation
            }
            Err(e) => {
                error!("Translation error: {e}");
                format!("Translation error: {e}")
            }
        }
    }
}
