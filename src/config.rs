//! Process configuration, read once at startup.
//!
//! Environment variables:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `TTS_API_KEY` | Bearer credential (falls back to `HUGGINGFACE_API_KEY`) |
//! | `TTS_HTTP_TIMEOUT_SECS` | Optional client timeout; unset leaves the transport default |
//! | `TTS_PROXY_URL` | Optional HTTP(S) proxy |
//! | `TTS_MODELS_FILE` | Optional YAML catalog replacing the built-in models |

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::ModelRegistry;
use crate::{Error, ErrorContext, Result};

pub const API_KEY_VAR: &str = "TTS_API_KEY";
pub const FALLBACK_API_KEY_VAR: &str = "HUGGINGFACE_API_KEY";
pub const TIMEOUT_VAR: &str = "TTS_HTTP_TIMEOUT_SECS";
pub const PROXY_VAR: &str = "TTS_PROXY_URL";
pub const MODELS_FILE_VAR: &str = "TTS_MODELS_FILE";

/// Bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(Error::configuration_with_context(
                "API credential is empty",
                ErrorContext::new()
                    .with_field_path(API_KEY_VAR)
                    .with_source("config"),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Everything the controller needs from its environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    pub timeout: Option<Duration>,
    pub proxy_url: Option<String>,
    pub models: ModelRegistry,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Reads the process environment. A missing credential is a
    /// configuration error, never an empty bearer header.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_VAR)
            .or_else(|| non_blank(FALLBACK_API_KEY_VAR))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    format!("{} is not set", API_KEY_VAR),
                    ErrorContext::new()
                        .with_field_path(API_KEY_VAR)
                        .with_source("config"),
                )
            })?;

        let mut builder = ConfigBuilder::new().api_key(api_key);

        if let Some(raw) = non_blank(TIMEOUT_VAR) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    format!("invalid timeout '{}'", raw),
                    ErrorContext::new()
                        .with_field_path(TIMEOUT_VAR)
                        .with_source("config"),
                )
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(proxy) = non_blank(PROXY_VAR) {
            builder = builder.proxy_url(proxy);
        }

        if let Some(path) = non_blank(MODELS_FILE_VAR) {
            builder = builder.models_file(path);
        }

        builder.build()
    }
}

pub struct ConfigBuilder {
    api_key: Option<String>,
    timeout: Option<Duration>,
    proxy_url: Option<String>,
    models: Option<ModelRegistry>,
    models_file: Option<PathBuf>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            timeout: None,
            proxy_url: None,
            models: None,
            models_file: None,
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    pub fn models(mut self, models: ModelRegistry) -> Self {
        self.models = Some(models);
        self
    }

    pub fn models_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.models_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        let credential = match self.api_key {
            Some(key) => Credential::new(key)?,
            None => {
                return Err(Error::configuration_with_context(
                    "API key required",
                    ErrorContext::new()
                        .with_field_path(API_KEY_VAR)
                        .with_source("config"),
                ))
            }
        };

        let models = match (self.models, self.models_file) {
            (Some(models), _) => models,
            (None, Some(path)) => ModelRegistry::from_path(&path)?,
            (None, None) => ModelRegistry::builtin(),
        };

        Ok(Config {
            credential,
            timeout: self.timeout,
            proxy_url: self.proxy_url,
            models,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
