//! # AI Settings
//!
//! The configuration surface consumed by the provider factory and the
//! adapters it builds.
//!
//! ## Sources
//!
//! Lowest to highest precedence:
//!
//! 1. Built-in defaults ([`AiSettings::default`])
//! 2. An optional TOML file ([`AiSettings::load`])
//! 3. The process environment
//!
//! ## Example
//!
//! ```toml
//! provider = "auto"
//! prefer_local = true
//!
//! [openrouter]
//! api_key = "${OPENROUTER_API_KEY}"
//! timeout_ms = 30000
//!
//! [ollama]
//! base_url = "http://localhost:11434"
//! ```

use super::error::ConfigError;
use super::selection::{FactoryConfig, ProviderKind};
use crate::constants::{
    DEFAULT_APP_BASE_URL, DEFAULT_APP_TITLE, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OPENROUTER_BASE_URL,
    ENV_AI_PREFER_LOCAL, ENV_AI_PROVIDER, ENV_AI_REQUEST_TIMEOUT, ENV_APP_BASE_URL,
    ENV_OLLAMA_BASE_URL, ENV_OPENROUTER_API_KEY, ENV_OPENROUTER_BASE_URL, OPENROUTER_TIMEOUT,
};
use std::path::Path;
use std::time::Duration;

/// Settings for the hosted aggregator adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRouterSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    /// Attribution sent as `HTTP-Referer`
    pub app_url: String,
    /// Attribution sent as `X-Title`
    pub app_title: String,
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            timeout: OPENROUTER_TIMEOUT,
            app_url: DEFAULT_APP_BASE_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }
}

/// Settings for the local daemon adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaSettings {
    pub base_url: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
        }
    }
}

/// Complete configuration surface for provider selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiSettings {
    pub provider: ProviderKind,
    pub prefer_local: Option<bool>,
    pub openrouter: OpenRouterSettings,
    pub ollama: OllamaSettings,
}

impl AiSettings {
    /// Load settings from an optional TOML file, then overlay the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_settings(path)
    }

    /// Defaults overlaid with the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        super::loader::load_settings(None)
    }

    /// Defaults overlaid with values from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        settings.apply_lookup(lookup)?;
        Ok(settings)
    }

    /// Selection state handed to a freshly constructed factory.
    pub fn factory_config(&self) -> FactoryConfig {
        FactoryConfig {
            provider: self.provider,
            prefer_local: self.prefer_local,
        }
    }

    /// Overwrite fields for every key the lookup knows. Blank values count as unset.
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get(ENV_AI_PROVIDER) {
            self.provider = value.parse()?;
        }
        if let Some(value) = get(ENV_AI_PREFER_LOCAL) {
            self.prefer_local = Some(parse_bool(ENV_AI_PREFER_LOCAL, &value)?);
        }
        if let Some(value) = get(ENV_OPENROUTER_API_KEY) {
            self.openrouter.api_key = Some(value);
        }
        if let Some(value) = get(ENV_OPENROUTER_BASE_URL) {
            self.openrouter.base_url = value;
        }
        if let Some(value) = get(ENV_AI_REQUEST_TIMEOUT) {
            self.openrouter.timeout = parse_millis(ENV_AI_REQUEST_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_APP_BASE_URL) {
            self.openrouter.app_url = value;
        }
        if let Some(value) = get(ENV_OLLAMA_BASE_URL) {
            self.ollama.base_url = value;
        }
        Ok(())
    }
}

pub(super) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

pub(super) fn parse_millis(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}
