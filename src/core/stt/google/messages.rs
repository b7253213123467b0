//! Wire types of the Speech-to-Text v1p1beta1 `speech:recognize` method.
//!
//! Field names follow the REST API's camelCase JSON mapping.

use serde::{Deserialize, Serialize};

use super::super::base::{RecognitionProfile, SpeechAlternative, SpeechSegment};

// =============================================================================
// Request
// =============================================================================

/// Body of `POST /v1p1beta1/speech:recognize`.
#[derive(Debug, Clone, Serialize)]
pub struct RecognizeRequest {
    pub config: RecognitionConfig,
    pub audio: RecognitionAudio,
}

/// Inline audio, base64 encoded.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionAudio {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: &'static str,
    pub sample_rate_hertz: u32,
    pub language_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_language_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_alternatives: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speech_contexts: Vec<SpeechContext>,
    pub enable_automatic_punctuation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecognitionMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub use_enhanced: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechContext {
    pub phrases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionMetadata {
    pub interaction_type: &'static str,
    pub microphone_distance: &'static str,
    pub recording_device_type: &'static str,
}

impl RecognitionMetadata {
    /// Close-talking dictation from a desktop browser.
    pub fn dictation() -> Self {
        Self {
            interaction_type: "DICTATION",
            microphone_distance: "NEARFIELD",
            recording_device_type: "PC",
        }
    }
}

impl From<&RecognitionProfile> for RecognitionConfig {
    fn from(profile: &RecognitionProfile) -> Self {
        let speech_contexts = if profile.phrase_hints.is_empty() {
            Vec::new()
        } else {
            vec![SpeechContext {
                phrases: profile.phrase_hints.clone(),
                boost: profile.hint_boost,
            }]
        };

        Self {
            encoding: "LINEAR16",
            sample_rate_hertz: profile.sample_rate_hertz,
            language_code: profile.language_code.clone(),
            alternative_language_codes: profile.alternative_language_codes.clone(),
            max_alternatives: profile.max_alternatives,
            speech_contexts,
            enable_automatic_punctuation: profile.automatic_punctuation,
            metadata: profile
                .dictation_metadata
                .then(RecognitionMetadata::dictation),
            model: profile.model.clone(),
            use_enhanced: profile.use_enhanced,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

/// Reply of `speech:recognize`. `results` is absent when nothing was heard.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl From<SpeechRecognitionResult> for SpeechSegment {
    fn from(result: SpeechRecognitionResult) -> Self {
        Self {
            alternatives: result
                .alternatives
                .into_iter()
                .map(|alt| SpeechAlternative {
                    transcript: alt.transcript,
                    confidence: alt.confidence.unwrap_or(0.0),
                })
                .collect(),
            language_code: result.language_code,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorResponse {
    pub error: GoogleErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorDetail {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}
