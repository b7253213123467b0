//! Google Cloud Speech-to-Text provider.
//!
//! Uses the synchronous `speech:recognize` REST method of the v1p1beta1 API,
//! which is the version that accepts `alternativeLanguageCodes`.
//!
//! # Authentication
//!
//! Requests carry whatever headers the shared
//! [`RequestAuthorizer`](crate::core::credentials::RequestAuthorizer) yields:
//! an OAuth2 bearer token for a service account or `x-goog-api-key`.
//!
//! # Example
//!
//! ```rust,ignore
//! use vaani_gateway::config::LanguageConfig;
//! use vaani_gateway::core::stt::{RecognitionProfile, SpeechRecognizer};
//! use vaani_gateway::core::stt::google::{GoogleSpeechConfig, GoogleSpeechRecognizer};
//!
//! let recognizer = GoogleSpeechRecognizer::new(GoogleSpeechConfig::default(), authorizer)?;
//! let profile = RecognitionProfile::primary(&LanguageConfig::default());
//! let segments = recognizer.recognize(&pcm, &profile).await?;
//! ```

mod client;
mod config;
mod messages;


pub(crate) use client::USER_AGENT;
pub use client::GoogleSpeechRecognizer;
pub use config::{API_VERSION, DEFAULT_CONNECT_TIMEOUT_SECS, GoogleSpeechConfig};
pub use messages::{
    GoogleErrorDetail, GoogleErrorResponse, RecognitionConfig, RecognitionMetadata,
    RecognizeRequest, RecognizeResponse, SpeechContext,
};
