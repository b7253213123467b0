use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::super::base::{TranslationError, Translator};
use super::messages::{LanguagesResponse, TranslateRequest, TranslateResponse, decode_html_entities};
use crate::config::DEFAULT_TRANSLATE_ENDPOINT;
use crate::core::credentials::RequestAuthorizer;
use crate::core::stt::google::{DEFAULT_CONNECT_TIMEOUT_SECS, GoogleErrorResponse, USER_AGENT};

const TRANSLATE_PATH: &str = "language/translate/v2";

/// Connection settings of the Google Translation client.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleTranslateConfig {
    /// Base URL, e.g. `https://translation.googleapis.com`
    pub endpoint: String,
    pub connect_timeout: Duration,
}

impl Default for GoogleTranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl GoogleTranslateConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/{TRANSLATE_PATH}{suffix}",
            self.endpoint.trim_end_matches('/')
        )
    }

    pub fn translate_url(&self) -> String {
        self.url("")
    }

    pub fn languages_url(&self) -> String {
        self.url("/languages")
    }
}

/// Translator backed by Google Cloud Translation (v2, "basic").
pub struct GoogleTranslator {
    client: Client,
    config: GoogleTranslateConfig,
    authorizer: Arc<dyn RequestAuthorizer>,
}

impl GoogleTranslator {
    pub fn new(
        config: GoogleTranslateConfig,
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

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, TranslationError> {
        let headers = self
            .authorizer
            .headers()
            .await
            .map_err(|e| TranslationError::Authorization(e.to_string()))?;

        let response = request
            .headers(headers)
            .send()
            .await
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::Network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GoogleErrorResponse>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            warn!(status = %status, "Translation request failed: {message}");
            return Err(TranslationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let request = self.client.post(self.config.translate_url()).json(&TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
        });

        let body = self.send(request).await?;
        let parsed: TranslateResponse = serde_json::from_str(&body)
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        let translation = parsed
            .data
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| TranslationError::InvalidResponse("no translations returned".into()))?;

        debug!(
            source,
            target,
            detected = ?translation.detected_source_language,
            "Translation complete"
        );

        Ok(decode_html_entities(&translation.translated_text))
    }

    async fn supported_languages(&self) -> Result<Vec<String>, TranslationError> {
        let request = self.client.get(self.config.languages_url());

        let body = self.send(request).await?;
        let parsed: LanguagesResponse = serde_json::from_str(&body)
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .data
            .languages
            .into_iter()
            .map(|entry| entry.language)
            .collect())
    }
}
