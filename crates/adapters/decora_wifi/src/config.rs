//! Settings of the Decora Wi-Fi integration.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::client::DEFAULT_BASE_URL;

/// `[integrations.decora_wifi]` section of `minihub.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecoraWifiConfig {
    /// myLeviton account e-mail.
    pub username: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Seconds between state refreshes; `0` disables polling.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_scan_interval_secs() -> u64 {
    30
}

fn deserialize_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl DecoraWifiConfig {
    /// Settings for `username` with every optional field at its default.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            scan_interval_secs: default_scan_interval_secs(),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}
