use std::path::PathBuf;

use zeroize::Zeroizing;

use super::ServerConfig;
use super::yaml::YamlConfig;

/// Apply YAML values on top of an environment-derived configuration.
///
/// Only keys present in the YAML file are touched.
pub(super) fn apply_yaml(config: &mut ServerConfig, yaml: YamlConfig) {
    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(seconds) = server.idle_timeout_seconds {
            config.idle_timeout_seconds = seconds;
        }
    }

    if let Some(google) = yaml.google {
        if let Some(path) = google.credentials_path {
            config.google_credentials_path = PathBuf::from(path);
        }
        if let Some(key) = google.api_key {
            config.google_api_key = Some(Zeroizing::new(key));
        }
        if let Some(endpoint) = google.speech_endpoint {
            config.speech_endpoint = endpoint;
        }
        if let Some(endpoint) = google.translate_endpoint {
            config.translate_endpoint = endpoint;
        }
    }

    if let Some(languages) = yaml.languages {
        if let Some(primary) = languages.primary {
            config.languages.primary = primary;
        }
        if let Some(fallback) = languages.fallback {
            config.languages.fallback = fallback;
        }
        if let Some(alternatives) = languages.alternatives {
            config.languages.alternatives = alternatives;
        }
        if let Some(source) = languages.translation_source {
            config.languages.translation_source = source;
        }
        if let Some(target) = languages.translation_target {
            config.languages.translation_target = target;
        }
    }

    if let Some(security) = yaml.security {
        if let Some(secret) = security.secret_key {
            config.secret_key = Some(Zeroizing::new(secret));
        }
        if let Some(origins) = security.cors_allowed_origins {
            config.cors_allowed_origins = Some(origins);
        }
    }
}
