use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown provider '{value}' (expected openrouter, ollama or auto)")]
    InvalidProvider { value: String },

    #[error("'{key}' must be a boolean, got '{value}'")]
    InvalidBool { key: String, value: String },

    #[error("'{key}' must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("failed to expand '{key}': {reason}")]
    Expand { key: String, reason: String },
}
