use super::error::ConfigError;
use super::settings::AiSettings;
use crate::constants::ENV_PATH;
use dotenvy::from_filename;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw settings file structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawSettings {
    pub provider: Option<String>,
    pub prefer_local: Option<bool>,
    #[serde(default)]
    pub openrouter: RawOpenRouter,
    #[serde(default)]
    pub ollama: RawOllama,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawOpenRouter {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub app_url: Option<String>,
    pub app_title: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawOllama {
    pub base_url: Option<String>,
}

/// Ensures environment variables are loaded from `.env`
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load settings from an optional file, then overlay the process environment
pub fn load_settings(path: Option<&Path>) -> Result<AiSettings, ConfigError> {
    ensure_env_loaded();
    let mut settings = match path {
        Some(path) => read_settings(path)?,
        None => AiSettings::default(),
    };
    settings.apply_lookup(|key| env::var(key).ok())?;
    debug!(
        provider = %settings.provider,
        prefer_local = ?settings.prefer_local,
        ollama_url = settings.ollama.base_url.as_str(),
        has_api_key = settings.openrouter.api_key.is_some(),
        "Resolved AI provider settings"
    );
    Ok(settings)
}

fn read_settings(path: &Path) -> Result<AiSettings, ConfigError> {
    debug!(path = %path.display(), "Reading AI settings file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed: RawSettings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    build(parsed)
}

fn build(raw: RawSettings) -> Result<AiSettings, ConfigError> {
    let mut settings = AiSettings::default();

    if let Some(provider) = raw.provider {
        settings.provider = expand("provider", &provider)?.parse()?;
    }
    settings.prefer_local = raw.prefer_local;

    let openrouter = raw.openrouter;
    if let Some(api_key) = openrouter.api_key {
        let api_key = expand("openrouter.api_key", &api_key)?;
        settings.openrouter.api_key = Some(api_key).filter(|key| !key.trim().is_empty());
    }
    if let Some(base_url) = openrouter.base_url {
        settings.openrouter.base_url = expand("openrouter.base_url", &base_url)?;
    }
    if let Some(timeout_ms) = openrouter.timeout_ms {
        settings.openrouter.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(app_url) = openrouter.app_url {
        settings.openrouter.app_url = expand("openrouter.app_url", &app_url)?;
    }
    if let Some(app_title) = openrouter.app_title {
        settings.openrouter.app_title = app_title;
    }
    if let Some(base_url) = raw.ollama.base_url {
        settings.ollama.base_url = expand("ollama.base_url", &base_url)?;
    }

    Ok(settings)
}

/// Expand `${VAR}` references. Unset variables expand to an empty string.
fn expand(key: &str, value: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(value, |var: &str| -> Result<Option<String>, env::VarError> {
        match env::var(var) {
            Ok(found) => Ok(Some(found)),
            Err(env::VarError::NotPresent) => Ok(Some(String::new())),
            Err(err) => Err(err),
        }
    })
    .map(|expanded| expanded.into_owned())
    .map_err(|err| ConfigError::Expand {
        key: key.to_string(),
        reason: err.to_string(),
    })
}
