//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `minihub.toml` in the working directory. The file is optional:
//! logging has a default filter and the Decora Wi-Fi integration can be
//! enabled from the environment alone. Environment variables take
//! precedence over file values.

use minihub_adapter_decora_wifi::DecoraWifiConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Per-integration settings.
    pub integrations: IntegrationsConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration settings; an absent section disables the integration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub decora_wifi: Option<DecoraWifiConfig>,
}

impl Config {
    /// Load configuration from `minihub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("minihub.toml")?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `var`, so tests never touch the process
    /// environment.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MINIHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }

        let username = var("MINIHUB_DECORA_USERNAME");
        let password = var("MINIHUB_DECORA_PASSWORD");
        if let Some(decora) = self.integrations.decora_wifi.as_mut() {
            if let Some(username) = username {
                decora.username = username;
            }
            if let Some(password) = password {
                decora.password = SecretString::from(password);
            }
        } else if let (Some(username), Some(password)) = (username, password) {
            self.integrations.decora_wifi = Some(DecoraWifiConfig::new(username, password));
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(decora) = &self.integrations.decora_wifi {
            if decora.username.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "decora_wifi.username must not be empty".to_string(),
                ));
            }
            if decora.password.expose_secret().is_empty() {
                return Err(ConfigError::Validation(
                    "decora_wifi.password must not be empty".to_string(),
                ));
            }
            if decora.timeout_secs == 0 {
                return Err(ConfigError::Validation(
                    "decora_wifi.timeout_secs must be non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "minihubd=info,minihub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
