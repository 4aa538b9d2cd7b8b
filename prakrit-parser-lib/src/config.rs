use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lookup::FallbackPolicy;

/// Analyzer configuration, usually read from a TOML file.
///
/// ```toml
/// request_timeout_ms = 2000
/// feedback_path = "feedback.jsonl"
///
/// [lookup]
/// endpoint = "https://forms.example.org/lookup"
/// auth_token_env = "PRAKRIT_LOOKUP_TOKEN"
/// timeout_ms = 500
/// retry = true
/// fallback = "on_unavailable"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lookup: LookupConfig,
    /// Overall budget for one analysis request.
    pub request_timeout_ms: u64,
    /// Append feedback as JSON lines here; discarded when unset.
    pub feedback_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Remote attested-form service. Only the embedded dataset is used when unset.
    pub endpoint: Option<String>,
    /// Environment variable holding the bearer token for `endpoint`.
    pub auth_token_env: Option<String>,
    pub timeout_ms: u64,
    pub retry: bool,
    pub fallback: FallbackPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            request_timeout_ms: 2000,
            feedback_path: None,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth_token_env: None,
            timeout_ms: 500,
            retry: true,
            fallback: FallbackPolicy::OnUnavailable,
        }
    }
}

impl Config {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Read the bearer token from the configured environment variable.
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|t| !t.is_empty())
    }
}
