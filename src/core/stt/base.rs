use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LanguageConfig;
use crate::core::phrases::{LEGACY_HINT_BOOST, PRIMARY_HINT_BOOST, phrase_hints};

/// Sample rate of the LINEAR16 audio produced by the browser client.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;

/// Parameters for a single recognition call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionProfile {
    /// BCP-47 language the request is made in
    pub language_code: String,
    /// Other languages the recognizer may detect inside the same request
    pub alternative_language_codes: Vec<String>,
    pub sample_rate_hertz: u32,
    /// Vocabulary bias terms; empty disables speech contexts
    pub phrase_hints: Vec<String>,
    pub hint_boost: Option<f32>,
    pub max_alternatives: Option<u32>,
    /// Recognition model name, provider default when `None`
    pub model: Option<String>,
    pub use_enhanced: bool,
    pub automatic_punctuation: bool,
    /// Attach dictation / near-field / PC recording metadata
    pub dictation_metadata: bool,
}

impl RecognitionProfile {
    /// Profile of the complete-recording flow: primary language, hints and
    /// alternative languages.
    pub fn primary(languages: &LanguageConfig) -> Self {
        Self {
            language_code: languages.primary.clone(),
            alternative_language_codes: languages.alternatives.clone(),
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HZ,
            phrase_hints: phrase_hints(),
            hint_boost: Some(PRIMARY_HINT_BOOST),
            max_alternatives: Some(1),
            model: Some("default".to_string()),
            use_enhanced: true,
            automatic_punctuation: true,
            dictation_metadata: true,
        }
    }

    /// Profile of the single retry made when the primary pass is empty.
    pub fn fallback(languages: &LanguageConfig) -> Self {
        Self {
            language_code: languages.fallback.clone(),
            alternative_language_codes: Vec::new(),
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HZ,
            phrase_hints: Vec::new(),
            hint_boost: None,
            max_alternatives: Some(1),
            model: None,
            use_enhanced: true,
            automatic_punctuation: true,
            dictation_metadata: false,
        }
    }

    /// Profile of the legacy chunk flow. The fallback language is listed
    /// first among the alternatives.
    pub fn legacy(languages: &LanguageConfig) -> Self {
        let mut alternatives = vec![languages.fallback.clone()];
        alternatives.extend(
            languages
                .alternatives
                .iter()
                .filter(|code| **code != languages.fallback)
                .cloned(),
        );

        Self {
            alternative_language_codes: alternatives,
            hint_boost: Some(LEGACY_HINT_BOOST),
            max_alternatives: None,
            ..Self::primary(languages)
        }
    }
}

/// One candidate transcript of a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAlternative {
    pub transcript: String,
    /// Confidence in [0, 1]; 0.0 when the backend omitted it
    pub confidence: f32,
}

/// One contiguous unit of recognized speech.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeechSegment {
    /// Candidates, best first
    pub alternatives: Vec<SpeechAlternative>,
    /// Language the backend detected for this segment, if reported
    pub language_code: Option<String>,
}

impl SpeechSegment {
    pub fn best(&self) -> Option<&SpeechAlternative> {
        self.alternatives.first()
    }
}

/// Outcome of [`recognize_with_fallback`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub segments: Vec<SpeechSegment>,
    /// Language of the request that produced `segments`
    pub language_code: String,
    pub used_fallback: bool,
}

/// Segments reduced to a single transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSummary {
    pub transcript: String,
    pub confidence: f32,
    /// Number of segments that contributed
    pub segment_count: usize,
}

/// Join the best alternative of every segment and average their confidence.
///
/// Segments without alternatives are skipped. With nothing to average the
/// confidence is 0.
pub fn summarize(segments: &[SpeechSegment]) -> TranscriptSummary {
    let best: Vec<&SpeechAlternative> = segments.iter().filter_map(SpeechSegment::best).collect();

    let transcript = best
        .iter()
        .map(|alt| alt.transcript.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let confidence = if best.is_empty() {
        0.0
    } else {
        best.iter().map(|alt| alt.confidence).sum::<f32>() / best.len() as f32
    };

    TranscriptSummary {
        transcript,
        confidence,
        segment_count: best.len(),
    }
}

/// Category of a failed recognition call, decided where the backend reply
/// is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// The backend could not decode the audio
    InvalidAudio,
    /// The recording is longer than a synchronous request accepts
    DurationExceeded,
    /// Credentials were rejected or lack the required role
    PermissionDenied,
    /// The requested language is not enabled for the project
    LanguageNotEnabled { language: String },
    /// The request never produced an HTTP response
    Transport,
    Other,
}

impl RecognitionErrorKind {
    /// Classify a backend failure.
    ///
    /// `api_status` is the canonical status string of a Google error body
    /// (e.g. `PERMISSION_DENIED`), `message` its human readable text.
    pub fn classify(http_status: u16, api_status: &str, message: &str, language: &str) -> Self {
        let lower = message.to_ascii_lowercase();

        if lower.contains("invalid audio") {
            Self::InvalidAudio
        } else if lower.contains("exceeds limit")
            || lower.contains("input too long")
            || lower.contains("exceeds duration")
        {
            Self::DurationExceeded
        } else if http_status == 401
            || http_status == 403
            || api_status == "PERMISSION_DENIED"
            || api_status == "UNAUTHENTICATED"
            || lower.contains("permission denied")
        {
            Self::PermissionDenied
        } else if lower.contains("not enabled") {
            Self::LanguageNotEnabled {
                language: language.to_string(),
            }
        } else {
            Self::Other
        }
    }
}

/// A failed recognition call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RecognitionError {
    pub kind: RecognitionErrorKind,
    /// Raw backend or transport message
    pub message: String,
}

impl RecognitionError {
    pub fn new(kind: RecognitionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RecognitionErrorKind::Transport, message)
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match &self.kind {
            RecognitionErrorKind::InvalidAudio => "Invalid audio format. Please try again.".to_string(),
            RecognitionErrorKind::DurationExceeded => {
                "Audio too long. Please record a shorter message.".to_string()
            }
            RecognitionErrorKind::PermissionDenied => {
                "API permission issue. Check Google Cloud credentials.".to_string()
            }
            RecognitionErrorKind::LanguageNotEnabled { language } => format!(
                "Language {language} not enabled in Google Cloud project. Enable it in the Cloud Console."
            ),
            RecognitionErrorKind::Transport | RecognitionErrorKind::Other => {
                format!("Error processing audio: {}", self.message)
            }
        }
    }
}

/// A speech-to-text backend answering one request per recording.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize a complete LINEAR16 recording.
    ///
    /// An empty vector means the backend heard no speech. Errors are not
    /// retried.
    async fn recognize(
        &self,
        audio: &[u8],
        profile: &RecognitionProfile,
    ) -> Result<Vec<SpeechSegment>, RecognitionError>;
}

/// Recognize with `primary`, retrying once with `fallback` when the primary
/// pass returns no segments.
///
/// `on_fallback` runs right before the retry. Errors from either call are
/// returned as is.
pub async fn recognize_with_fallback<F, Fut>(
    recognizer: &dyn SpeechRecognizer,
    audio: &[u8],
    primary: &RecognitionProfile,
    fallback: Option<&RecognitionProfile>,
    on_fallback: F,
) -> Result<Recognition, RecognitionError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let segments = recognizer.recognize(audio, primary).await?;
    if !segments.is_empty() {
        return Ok(Recognition {
            segments,
            language_code: primary.language_code.clone(),
            used_fallback: false,
        });
    }

    let Some(fallback) = fallback else {
        return Ok(Recognition {
            segments,
            language_code: primary.language_code.clone(),
            used_fallback: false,
        });
    };

    on_fallback().await;
    let segments = recognizer.recognize(audio, fallback).await?;

    Ok(Recognition {
        segments,
        language_code: fallback.language_code.clone(),
        used_fallback: true,
    })
}
