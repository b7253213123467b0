use std::time::Duration;

use crate::config::DEFAULT_SPEECH_ENDPOINT;

/// API version path segment of the recognize method.
pub const API_VERSION: &str = "v1p1beta1";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Connection settings of the Google Speech-to-Text client.
///
/// No overall request timeout is applied; a recognize call waits for the
/// service's own deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleSpeechConfig {
    /// Base URL, e.g. `https://speech.googleapis.com`
    pub endpoint: String,
    pub connect_timeout: Duration,
}

impl Default for GoogleSpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SPEECH_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl GoogleSpeechConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Full URL of the synchronous recognize method.
    pub fn recognize_url(&self) -> String {
        format!(
            "{}/{API_VERSION}/speech:recognize",
            self.endpoint.trim_end_matches('/')
        )
    }
}
