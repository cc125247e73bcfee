//! Application constants
//!
//! Single source of truth for environment variable names, endpoints and timeouts.

use std::time::Duration;

/// Default environment file path, loaded once before reading the environment
pub const ENV_PATH: &str = ".env";

/// Provider selection mode: `openrouter`, `ollama` or `auto`
pub const ENV_AI_PROVIDER: &str = "AI_PROVIDER";
/// Whether auto-selection probes the local daemon first
pub const ENV_AI_PREFER_LOCAL: &str = "AI_PREFER_LOCAL";
pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_OPENROUTER_BASE_URL: &str = "OPENROUTER_BASE_URL";
/// Cloud completion timeout in milliseconds
pub const ENV_AI_REQUEST_TIMEOUT: &str = "AI_REQUEST_TIMEOUT";
/// Sent as `HTTP-Referer` to identify the calling application
pub const ENV_APP_BASE_URL: &str = "APP_BASE_URL";
pub const ENV_OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";

pub const OPENROUTER_NAME: &str = "OpenRouter";
pub const OPENROUTER_DISPLAY_NAME: &str = "OpenRouter (Cloud)";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_TITLE: &str = "Guitar CRM";
pub const OPENROUTER_TIMEOUT: Duration = Duration::from_secs(30);
pub const OPENROUTER_MAX_RETRIES: u32 = 3;

pub const OLLAMA_NAME: &str = "Ollama";
pub const OLLAMA_DISPLAY_NAME: &str = "Ollama (Local)";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const OLLAMA_TIMEOUT: Duration = Duration::from_secs(60);
pub const OLLAMA_MAX_RETRIES: u32 = 2;
/// Liveness probe against `/api/tags`
pub const OLLAMA_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
/// Model enumeration against `/api/tags`
pub const OLLAMA_LIST_TIMEOUT: Duration = Duration::from_secs(5);
pub const OLLAMA_DEFAULT_TEMPERATURE: f32 = 0.7;
