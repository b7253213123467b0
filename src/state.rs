use std::sync::Arc;

use tracing::{error, info, warn};

use crate::auth::SessionSigner;
use crate::config::ServerConfig;
use crate::core::credentials::{CredentialError, GoogleIdentity, load_identity};
use crate::core::stt::{GoogleSpeechConfig, GoogleSpeechRecognizer, SpeechRecognizer};
use crate::core::translate::{GoogleTranslateConfig, GoogleTranslator, Translator};

/// Speech and translation clients shared by every session.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct Backends {
    pub speech: Arc<dyn SpeechRecognizer>,
    pub translator: Arc<dyn Translator>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

impl Backends {
    /// Build the Google clients for an authenticated identity.
    pub fn google(
        config: &ServerConfig,
        identity: &GoogleIdentity,
    ) -> Result<Self, CredentialError> {
        let speech = GoogleSpeechRecognizer::new(
            GoogleSpeechConfig::with_endpoint(config.speech_endpoint.clone()),
            identity.authorizer.clone(),
        )
        .map_err(|e| CredentialError::Build(format!("speech client: {e}")))?;

        let translator = GoogleTranslator::new(
            GoogleTranslateConfig::with_endpoint(config.translate_endpoint.clone()),
            identity.authorizer.clone(),
        )
        .map_err(|e| CredentialError::Build(format!("translation client: {e}")))?;

        Ok(Self {
            speech: Arc::new(speech),
            translator: Arc::new(translator),
        })
    }

    /// Log whether the translator supports `language`. Failures are only logged.
    pub async fn probe_translation_language(&self, language: &str) {
        match self.translator.supported_languages().await {
            Ok(languages) => {
                let supported = languages.iter().any(|code| code == language);
                info!(
                    language,
                    supported,
                    total = languages.len(),
                    "Checked translation language support"
                );
                if !supported {
                    warn!("Translation source language '{language}' is not in the supported list");
                }
            }
            Err(e) => error!("Error checking translation languages: {e}"),
        }
    }
}

/// Application state shared across all handlers
pub struct AppState {
    pub config: ServerConfig,
    /// `None` when credentials failed to load; every audio request then
    /// fails fast.
    pub backends: Option<Backends>,
    pub signer: SessionSigner,
}

impl AppState {
    /// Load credentials, build the backend clients and probe translation
    /// language support.
    ///
    /// Credential failures are logged and leave `backends` empty for the
    /// lifetime of the process.
    pub async fn new(config: ServerConfig) -> Arc<Self> {
        let backends = match Self::connect_backends(&config).await {
            Ok(backends) => Some(backends),
            Err(e) => {
                error!("Error initializing Google Cloud clients: {e}");
                None
            }
        };

        Self::with_backends(config, backends)
    }

    /// Build state around already constructed backends.
    pub fn with_backends(config: ServerConfig, backends: Option<Backends>) -> Arc<Self> {
        let signer = SessionSigner::from_secret(config.secret_key.as_ref().map(|s| s.as_str()));

        Arc::new(Self {
            config,
            backends,
            signer,
        })
    }

    async fn connect_backends(config: &ServerConfig) -> Result<Backends, CredentialError> {
        let identity = load_identity(config)?;
        match identity.project_id.as_deref() {
            Some(project) => info!(project, "Google Cloud credentials loaded"),
            None => info!("Google Cloud credentials loaded"),
        }

        let backends = Backends::google(config, &identity)?;
        backends
            .probe_translation_language(&config.languages.translation_source)
            .await;

        Ok(backends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_missing_credentials_disable_backends() {
        let config = ServerConfig {
            google_credentials_path: PathBuf::from("/nonexistent/google-credentials.json"),
            secret_key: Some(zeroize::Zeroizing::new("test-secret".to_string())),
            ..Default::default()
        };

        let state = AppState::new(config).await;
        assert!(state.backends.is_none());
    }

    #[test]
    fn test_signer_uses_configured_secret() {
        let config = ServerConfig {
            secret_key: Some(zeroize::Zeroizing::new("shared".to_string())),
            ..Default::default()
        };

        let a = AppState::with_backends(config.clone(), None);
        let b = AppState::with_backends(config, None);
        let (id, token) = a.signer.mint();

        assert_eq!(b.signer.verify(&token), Some(id));
    }
}
