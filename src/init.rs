//! Credential check for the `vaani-gateway check-credentials` CLI command.
//!
//! The command loads the configured Google credentials, builds the backend
//! clients and asks the translation service for its language list, so a
//! broken deployment is caught before the server starts.
//!
//! ```text
//! $ GOOGLE_APPLICATION_CREDENTIALS=/etc/vaani/key.json vaani-gateway check-credentials
//! ```

use anyhow::{Context, Result};
use tracing::info;

use crate::config::ServerConfig;
use crate::core::credentials::load_identity;
use crate::state::Backends;

/// Load credentials and probe the translation service.
///
/// Fails when the credentials cannot be loaded, when no authorization headers
/// can be obtained, or when the language list request fails.
pub async fn check_credentials(config: &ServerConfig) -> Result<()> {
    let identity = load_identity(config).context("Failed to load Google credentials")?;

    info!(
        project = identity.project_id.as_deref().unwrap_or("<api key>"),
        kind = identity.authorizer.kind(),
        "Credentials loaded"
    );

    identity
        .authorizer
        .headers()
        .await
        .context("Failed to obtain authorization headers")?;

    let backends =
        Backends::google(config, &identity).context("Failed to build Google clients")?;

    let languages = backends
        .translator
        .supported_languages()
        .await
        .context("Failed to list translation languages")?;

    let source = &config.languages.translation_source;
    let supported = languages.iter().any(|code| code == source);
    info!(
        source = %source,
        supported,
        total = languages.len(),
        "Translation service reachable"
    );

    if !supported {
        anyhow::bail!("Translation source language '{source}' is not supported");
    }

    Ok(())
}
