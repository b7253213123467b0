use async_trait::async_trait;
use thiserror::Error;

/// Failures of a translation call.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Translation API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),
}

/// A text translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` (ISO-639 codes).
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError>;

    /// Language codes the backend can translate.
    async fn supported_languages(&self) -> Result<Vec<String>, TranslationError>;
}
