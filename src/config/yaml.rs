use serde::Deserialize;
use std::path::PathBuf;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override the environment.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 5001
///   idle_timeout_seconds: 300
///
/// google:
///   credentials_path: "/etc/vaani/google-credentials.json"
///   api_key: "optional-api-key"
///   speech_endpoint: "https://speech.googleapis.com"
///   translate_endpoint: "https://translation.googleapis.com"
///
/// languages:
///   primary: "ne-NP"
///   fallback: "en-US"
///   alternatives: ["hi-IN", "en-US"]
///   translation_source: "ne"
///   translation_target: "en"
///
/// security:
///   secret_key: "session-signing-secret"
///   cors_allowed_origins: "*"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub google: Option<GoogleYaml>,
    pub languages: Option<LanguagesYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub idle_timeout_seconds: Option<u64>,
}

/// Google Cloud access from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GoogleYaml {
    /// Path to the service-account JSON file
    pub credentials_path: Option<String>,
    /// API key alternative to the service-account file
    pub api_key: Option<String>,
    pub speech_endpoint: Option<String>,
    pub translate_endpoint: Option<String>,
}

/// Recognition and translation languages from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LanguagesYaml {
    pub primary: Option<String>,
    pub fallback: Option<String>,
    pub alternatives: Option<Vec<String>>,
    pub translation_source: Option<String>,
    pub translation_target: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub secret_key: Option<String>,
    pub cors_allowed_origins: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Required fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: YamlConfig =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }
}
