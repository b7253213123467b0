pub mod credentials;
pub mod phrases;
pub mod stt;
pub mod translate;

// Re-export commonly used types for convenience
pub use credentials::{CredentialError, GoogleIdentity, RequestAuthorizer, load_identity};

pub use stt::{
    GoogleSpeechConfig, GoogleSpeechRecognizer, Recognition, RecognitionError,
    RecognitionErrorKind, RecognitionProfile, SpeechAlternative, SpeechRecognizer, SpeechSegment,
    TranscriptSummary, recognize_with_fallback, summarize,
};

pub use translate::{GoogleTranslateConfig, GoogleTranslator, TranslationError, Translator};
