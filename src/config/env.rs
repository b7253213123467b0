use std::path::PathBuf;

use zeroize::Zeroizing;

use super::{ConfigError, LanguageConfig, ServerConfig};

/// Read a variable, treating empty values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
        key: "PORT".to_string(),
        message: format!("'{value}' is not a valid port: {e}"),
    })
}

fn parse_seconds(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{value}' is not a whole number of seconds: {e}"),
    })
}

/// Split a comma-separated list, dropping blank entries.
pub(super) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Build a configuration from defaults overlaid with environment variables.
pub(super) fn load_from_env() -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    if let Some(port) = env_var("PORT") {
        config.port = parse_port(&port)?;
    }

    if let Some(seconds) = env_var("IDLE_TIMEOUT_SECONDS") {
        config.idle_timeout_seconds = parse_seconds("IDLE_TIMEOUT_SECONDS", &seconds)?;
    }

    config.secret_key = env_var("SECRET_KEY").map(Zeroizing::new);

    if let Some(path) = env_var("GOOGLE_APPLICATION_CREDENTIALS") {
        config.google_credentials_path = PathBuf::from(path);
    }
    config.google_api_key = env_var("GOOGLE_API_KEY").map(Zeroizing::new);

    if let Some(endpoint) = env_var("SPEECH_ENDPOINT") {
        config.speech_endpoint = endpoint;
    }
    if let Some(endpoint) = env_var("TRANSLATE_ENDPOINT") {
        config.translate_endpoint = endpoint;
    }

    let defaults = LanguageConfig::default();
    config.languages = LanguageConfig {
        primary: env_var("PRIMARY_LANGUAGE").unwrap_or(defaults.primary),
        fallback: env_var("FALLBACK_LANGUAGE").unwrap_or(defaults.fallback),
        alternatives: env_var("ALTERNATIVE_LANGUAGES")
            .map(|v| parse_list(&v))
            .unwrap_or(defaults.alternatives),
        translation_source: env_var("TRANSLATION_SOURCE_LANGUAGE")
            .unwrap_or(defaults.translation_source),
        translation_target: env_var("TRANSLATION_TARGET_LANGUAGE")
            .unwrap_or(defaults.translation_target),
    };

    if let Some(origins) = env_var("CORS_ALLOWED_ORIGINS") {
        config.cors_allowed_origins = Some(origins);
    }

    Ok(config)
}
