//! Configuration module for Vaani Gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Applying YAML overrides on top of the environment
//!
//! # Example
//! ```rust,no_run
//! use vaani_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;
use zeroize::Zeroizing;

mod env;
mod merge;
mod yaml;

pub use yaml::YamlConfig;

/// Default session idle timeout (5 minutes)
pub const DEFAULT_IDLE_TIMEOUT_SECONDS: u64 = 300;

/// Default Google Cloud Speech-to-Text endpoint
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://speech.googleapis.com";

/// Default Google Cloud Translation endpoint
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translation.googleapis.com";

/// Default location of the service-account credential file
pub const DEFAULT_CREDENTIALS_PATH: &str = "google-credentials.json";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse YAML config: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Language settings shared by the recognition and translation calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// BCP-47 code the recognizer is primarily tuned for (e.g. "ne-NP")
    pub primary: String,
    /// Single language retried when the primary pass returns nothing
    pub fallback: String,
    /// Extra codes the recognizer may switch to inside the primary pass
    pub alternatives: Vec<String>,
    /// Source language handed to the translator (e.g. "ne")
    pub translation_source: String,
    /// Output language of every translation (e.g. "en")
    pub translation_target: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            primary: "ne-NP".to_string(),
            fallback: "en-US".to_string(),
            alternatives: vec!["hi-IN".to_string(), "en-US".to_string()],
            translation_source: "ne".to_string(),
            translation_target: "en".to_string(),
        }
    }
}

/// Server configuration
///
/// Secrets are held in [`Zeroizing`] wrappers so they are wiped when the
/// configuration is dropped.
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port)
/// - Session signing secret
/// - Google Cloud credentials and endpoints
/// - Language settings
/// - CORS
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    /// Secret used to sign session identifiers.
    /// When unset a random per-process key is generated.
    pub secret_key: Option<Zeroizing<String>>,

    /// Path to the Google service-account JSON file
    pub google_credentials_path: PathBuf,
    /// Google API key; takes precedence over the service-account file
    pub google_api_key: Option<Zeroizing<String>>,

    /// Base URL of the Speech-to-Text REST API
    pub speech_endpoint: String,
    /// Base URL of the Translation REST API
    pub translate_endpoint: String,

    pub languages: LanguageConfig,

    /// Comma-separated list of origins, or "*" for any origin
    pub cors_allowed_origins: Option<String>,

    /// Close a session after this many seconds without an inbound frame
    pub idle_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            secret_key: None,
            google_credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            google_api_key: None,
            speech_endpoint: DEFAULT_SPEECH_ENDPOINT.to_string(),
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            languages: LanguageConfig::default(),
            cors_allowed_origins: Some("*".to_string()),
            idle_timeout_seconds: DEFAULT_IDLE_TIMEOUT_SECONDS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and defaults).
    ///
    /// The .env file is loaded by `main` before this is called, so its values
    /// are visible here as ordinary environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = env::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let yaml_config = YamlConfig::from_file(path)?;

        let mut config = env::load_from_env()?;
        merge::apply_yaml(&mut config, yaml_config);

        config.validate()?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the merged configuration for values that cannot work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, endpoint) in [
            ("SPEECH_ENDPOINT", &self.speech_endpoint),
            ("TRANSLATE_ENDPOINT", &self.translate_endpoint),
        ] {
            let parsed = url::Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{endpoint}' is not a valid URL: {e}"),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{endpoint}' must use http or https"),
                });
            }
        }

        if self.idle_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "IDLE_TIMEOUT_SECONDS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        for (key, value) in [
            ("PRIMARY_LANGUAGE", &self.languages.primary),
            ("FALLBACK_LANGUAGE", &self.languages.fallback),
            ("TRANSLATION_SOURCE_LANGUAGE", &self.languages.translation_source),
            ("TRANSLATION_TARGET_LANGUAGE", &self.languages.translation_target),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        unsafe {
            for key in [
                "HOST",
                "PORT",
                "SECRET_KEY",
                "GOOGLE_APPLICATION_CREDENTIALS",
                "GOOGLE_API_KEY",
                "SPEECH_ENDPOINT",
                "TRANSLATE_ENDPOINT",
                "PRIMARY_LANGUAGE",
                "FALLBACK_LANGUAGE",
                "ALTERNATIVE_LANGUAGES",
                "TRANSLATION_SOURCE_LANGUAGE",
                "TRANSLATION_TARGET_LANGUAGE",
                "CORS_ALLOWED_ORIGINS",
                "IDLE_TIMEOUT_SECONDS",
            ] {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_address() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_default_languages() {
        let languages = LanguageConfig::default();
        assert_eq!(languages.primary, "ne-NP");
        assert_eq!(languages.fallback, "en-US");
        assert_eq!(languages.alternatives, vec!["hi-IN", "en-US"]);
        assert_eq!(languages.translation_source, "ne");
        assert_eq!(languages.translation_target, "en");
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = ServerConfig {
            speech_endpoint: "not a url".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SPEECH_ENDPOINT"));

        let config = ServerConfig {
            translate_endpoint: "ftp://translation.example.com".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_empty_language() {
        let mut config = ServerConfig::default();
        config.languages.primary = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("PRIMARY_LANGUAGE"));
    }

    #[test]
    fn test_validate_rejects_zero_idle_timeout() {
        let config = ServerConfig {
            idle_timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("IDLE_TIMEOUT_SECONDS"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5001);
        assert!(config.secret_key.is_none());
        assert_eq!(
            config.google_credentials_path,
            PathBuf::from(DEFAULT_CREDENTIALS_PATH)
        );
        assert_eq!(config.speech_endpoint, DEFAULT_SPEECH_ENDPOINT);
        assert_eq!(config.cors_allowed_origins.as_deref(), Some("*"));
        assert_eq!(config.idle_timeout_seconds, DEFAULT_IDLE_TIMEOUT_SECONDS);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "9000");
            env::set_var("SECRET_KEY", "s3cret");
            env::set_var("GOOGLE_APPLICATION_CREDENTIALS", "/etc/gcp/key.json");
            env::set_var("ALTERNATIVE_LANGUAGES", "hi-IN, en-IN ,");
            env::set_var("TRANSLATION_TARGET_LANGUAGE", "fr");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.secret_key.as_ref().map(|s| s.as_str()),
            Some("s3cret")
        );
        assert_eq!(
            config.google_credentials_path,
            PathBuf::from("/etc/gcp/key.json")
        );
        assert_eq!(config.languages.alternatives, vec!["hi-IN", "en-IN"]);
        assert_eq!(config.languages.translation_target, "fr");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "not-a-port");
        }

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 8080

google:
  credentials_path: "/yaml/creds.json"

languages:
  fallback: "en-GB"
"#;
        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            env::set_var("HOST", "0.0.0.0");
            env::set_var("GOOGLE_APPLICATION_CREDENTIALS", "/env/creds.json");
            env::set_var("PRIMARY_LANGUAGE", "hi-IN");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.google_credentials_path,
            PathBuf::from("/yaml/creds.json")
        );
        assert_eq!(config.languages.fallback, "en-GB");
        // ENV value survives where YAML is silent
        assert_eq!(config.languages.primary, "hi-IN");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let config_path = PathBuf::from("/nonexistent/config.yaml");
        let result = ServerConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_yaml() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");
        fs::write(&config_path, "invalid: yaml: [content").unwrap();

        let result = ServerConfig::from_file(&config_path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }
}
