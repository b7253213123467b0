//! Google Speech-to-Text REST client.
//!
//! One `speech:recognize` call per recording. The whole recording travels
//! inline as base64, which limits it to roughly one minute of audio.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::super::base::{
    RecognitionError, RecognitionErrorKind, RecognitionProfile, SpeechRecognizer, SpeechSegment,
};
use super::config::GoogleSpeechConfig;
use super::messages::{
    GoogleErrorResponse, RecognitionAudio, RecognitionConfig, RecognizeRequest, RecognizeResponse,
};
use crate::core::credentials::RequestAuthorizer;

/// User-Agent header value for API requests.
pub(crate) const USER_AGENT: &str = concat!("Vaani-Gateway/", env!("CARGO_PKG_VERSION"));

/// Speech recognizer backed by Google Cloud Speech-to-Text.
pub struct GoogleSpeechRecognizer {
    client: Client,
    config: GoogleSpeechConfig,
    authorizer: Arc<dyn RequestAuthorizer>,
}

impl GoogleSpeechRecognizer {
    /// Create a recognizer sharing `authorizer` with the other Google clients.
    pub fn new(
        config: GoogleSpeechConfig,
        authorizer: Arc<dyn RequestAuthorizer>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            config,
            authorizer,
        })
    }

    pub fn config(&self) -> &GoogleSpeechConfig {
        &self.config
    }

    /// Turn a non-success reply into a classified error.
    fn classify_failure(
        status: reqwest::StatusCode,
        body: &str,
        profile: &RecognitionProfile,
    ) -> RecognitionError {
        let (api_status, message) = match serde_json::from_str::<GoogleErrorResponse>(body) {
            Ok(parsed) => (parsed.error.status, parsed.error.message),
            Err(_) => (String::new(), format!("HTTP {status}: {body}")),
        };

        let kind = RecognitionErrorKind::classify(
            status.as_u16(),
            &api_status,
            &message,
            &profile.language_code,
        );
        RecognitionError::new(kind, message)
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleSpeechRecognizer {
    async fn recognize(
        &self,
        audio: &[u8],
        profile: &RecognitionProfile,
    ) -> Result<Vec<SpeechSegment>, RecognitionError> {
        let headers = self.authorizer.headers().await.map_err(|e| {
            RecognitionError::new(RecognitionErrorKind::PermissionDenied, e.to_string())
        })?;

        let request = RecognizeRequest {
            config: RecognitionConfig::from(profile),
            audio: RecognitionAudio {
                content: BASE64_STANDARD.encode(audio),
            },
        };

        info!(
            language = %profile.language_code,
            bytes = audio.len(),
            "Sending audio to Google Speech-to-Text"
        );

        let response = self
            .client
            .post(self.config.recognize_url())
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| RecognitionError::transport(format!("Speech request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            RecognitionError::transport(format!("Failed to read speech response: {e}"))
        })?;

        if !status.is_success() {
            let err = Self::classify_failure(status, &body, profile);
            warn!(status = %status, kind = ?err.kind, "Speech recognition failed: {}", err.message);
            return Err(err);
        }

        let parsed: RecognizeResponse = serde_json::from_str(&body).map_err(|e| {
            RecognitionError::new(
                RecognitionErrorKind::Other,
                format!("Failed to parse speech response: {e}"),
            )
        })?;

        let segments: Vec<SpeechSegment> =
            parsed.results.into_iter().map(SpeechSegment::from).collect();

        info!(
            language = %profile.language_code,
            results = segments.len(),
            "Got speech recognition response"
        );
        for (index, segment) in segments.iter().enumerate() {
            if let Some(best) = segment.best() {
                debug!(
                    index = index + 1,
                    transcript = %best.transcript,
                    confidence = best.confidence,
                    "Recognized segment"
                );
            }
        }

        Ok(segments)
    }
}
