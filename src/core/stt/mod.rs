//! Speech-to-text.
//!
//! [`SpeechRecognizer`] is the seam between the session pipeline and a cloud
//! recognizer. [`recognize_with_fallback`] adds the single fallback-language
//! retry on top of any implementation.

pub mod base;
pub mod google;

pub use base::{
    DEFAULT_SAMPLE_RATE_HZ, Recognition, RecognitionError, RecognitionErrorKind,
    RecognitionProfile, SpeechAlternative, SpeechRecognizer, SpeechSegment, TranscriptSummary,
    recognize_with_fallback, summarize,
};
pub use google::{GoogleSpeechConfig, GoogleSpeechRecognizer};
