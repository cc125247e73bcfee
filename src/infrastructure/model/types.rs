//! Model types - configuration, request, result and error types

use crate::domain::types::ChatMessage;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Adapter configuration. Owned by the adapter; callers only ever see clones.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "timeoutMs", with = "duration_millis")]
    pub timeout: Duration,
    pub max_retries: u32,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout,
            max_retries,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("headers", &self.headers)
            .finish()
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Catalog entry describing a model a provider can serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub description: String,
    pub best_for: Vec<String>,
    pub context_window: u32,
    pub is_free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_local: Option<bool>,
}

/// Chat completion request as built by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            stream: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Rejects requests no backend can serve: a blank model or no messages.
    pub fn validate(&self, provider: &str) -> Result<(), ModelError> {
        if self.model.trim().is_empty() {
            return Err(ModelError::invalid_request(provider, "model must not be empty"));
        }
        if self.messages.is_empty() {
            return Err(ModelError::invalid_request(provider, "messages must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Successful completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Failed completion, captured instead of raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl CompletionFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            details: None,
        }
    }

    /// Failure with `message`, taking code and details from the underlying error.
    pub fn from_error(message: impl Into<String>, err: &ModelError) -> Self {
        Self {
            error: message.into(),
            code: Some(err.code()),
            details: err.details(),
        }
    }
}

/// Outcome of [`complete`](super::CompletionProvider::complete).
///
/// Serializes untagged: a failure is recognised by the presence of `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionResult {
    Failure(CompletionFailure),
    Success(Completion),
}

impl CompletionResult {
    pub fn is_error(&self) -> bool {
        matches!(self, CompletionResult::Failure(_))
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            CompletionResult::Success(completion) => Some(completion.content.as_str()),
            CompletionResult::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            CompletionResult::Failure(failure) => Some(failure.error.as_str()),
            CompletionResult::Success(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Completion, CompletionFailure> {
        match self {
            CompletionResult::Success(completion) => Ok(completion),
            CompletionResult::Failure(failure) => Err(failure),
        }
    }
}

impl From<Completion> for CompletionResult {
    fn from(value: Completion) -> Self {
        CompletionResult::Success(value)
    }
}

impl From<CompletionFailure> for CompletionResult {
    fn from(value: CompletionFailure) -> Self {
        CompletionResult::Failure(value)
    }
}

/// Incremental piece of a streamed completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunk {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    pub done: bool,
}

impl StreamChunk {
    /// Terminal chunk signalling the stream could not be produced.
    pub fn error() -> Self {
        Self {
            finish_reason: Some("error".to_string()),
            done: true,
            ..Self::default()
        }
    }
}

/// How a request failed before any HTTP status was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Request,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Timeout => "timeout",
            TransportKind::Connect => "connect",
            TransportKind::Request => "request",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{provider} API key is not configured.")]
    MissingApiKey { provider: String },
    #[error("{kind} error calling {provider}: {message}")]
    Transport {
        provider: String,
        kind: TransportKind,
        message: String,
    },
    #[error("{provider} API error: {status}")]
    Upstream {
        provider: String,
        status: StatusCode,
        body: Value,
    },
    #[error("{provider} returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("Invalid request for {provider}: {reason}")]
    InvalidRequest { provider: String, reason: String },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Classify a `reqwest` failure, keeping the full source chain as the message.
    pub fn transport(provider: impl Into<String>, source: &reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            TransportKind::Timeout
        } else if source.is_connect() {
            TransportKind::Connect
        } else {
            TransportKind::Request
        };
        Self::Transport {
            provider: provider.into(),
            kind,
            message: error_chain(source),
        }
    }

    pub fn upstream(provider: impl Into<String>, status: StatusCode, body: Value) -> Self {
        Self::Upstream {
            provider: provider.into(),
            status,
            body,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_request(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ModelError::Transport {
                kind: TransportKind::Timeout,
                ..
            }
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ModelError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short machine-readable code carried into [`CompletionFailure::code`].
    pub fn code(&self) -> String {
        match self {
            ModelError::MissingApiKey { .. } => "CONFIGURATION_ERROR".to_string(),
            ModelError::Transport {
                kind: TransportKind::Timeout,
                ..
            } => "TIMEOUT".to_string(),
            ModelError::Transport { .. } => "NETWORK_ERROR".to_string(),
            ModelError::Upstream { status, .. } => status.as_u16().to_string(),
            ModelError::InvalidResponse { .. } => "INVALID_RESPONSE".to_string(),
            ModelError::InvalidRequest { .. } => "INVALID_REQUEST".to_string(),
        }
    }

    /// Diagnostic payload carried into [`CompletionFailure::details`].
    pub fn details(&self) -> Option<Value> {
        match self {
            ModelError::MissingApiKey { .. } => None,
            ModelError::Transport { kind, message, .. } => Some(json!({
                "kind": kind.as_str(),
                "message": message,
            })),
            ModelError::Upstream { body, .. } => Some(body.clone()),
            ModelError::InvalidResponse { reason, .. }
            | ModelError::InvalidRequest { reason, .. } => Some(json!({ "reason": reason })),
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_without_error_field() {
        let result = CompletionResult::from(Completion {
            content: "Hello".into(),
            finish_reason: Some("stop".into()),
            usage: None,
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, json!({"content": "Hello", "finishReason": "stop"}));
    }

    #[test]
    fn failure_is_recognised_by_error_field() {
        let parsed: CompletionResult =
            serde_json::from_value(json!({"error": "boom", "code": "500"})).unwrap();
        assert!(parsed.is_error());
        assert_eq!(parsed.error_message(), Some("boom"));
        assert_eq!(parsed.content(), None);

        let parsed: CompletionResult = serde_json::from_value(json!({"content": "ok"})).unwrap();
        assert!(!parsed.is_error());
        assert_eq!(parsed.content(), Some("ok"));
    }

    #[test]
    fn upstream_error_maps_status_to_code() {
        let err = ModelError::upstream(
            "OpenRouter",
            StatusCode::UNAUTHORIZED,
            json!({"error": "Invalid API key"}),
        );
        assert_eq!(err.to_string(), "OpenRouter API error: 401 Unauthorized");
        let failure = CompletionFailure::from_error("request failed", &err);
        assert_eq!(failure.code.as_deref(), Some("401"));
        assert_eq!(failure.details, Some(json!({"error": "Invalid API key"})));
    }

    #[test]
    fn transport_details_keep_cause() {
        let err = ModelError::Transport {
            provider: "Ollama".into(),
            kind: TransportKind::Connect,
            message: "connection refused".into(),
        };
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert_eq!(
            err.details(),
            Some(json!({"kind": "connect", "message": "connection refused"}))
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn validate_rejects_blank_model_and_empty_messages() {
        let ok = CompletionRequest::new("llama3.2", vec![ChatMessage::user("Hi")]);
        assert!(ok.validate("Ollama").is_ok());

        let err = CompletionRequest::new("  ", vec![ChatMessage::user("Hi")])
            .validate("Ollama")
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(err.details(), Some(json!({"reason": "model must not be empty"})));

        let err = CompletionRequest::new("llama3.2", Vec::new())
            .validate("OpenRouter")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid request for OpenRouter: messages must not be empty"
        );
    }

    #[test]
    fn config_debug_redacts_api_key() {
        let config = ProviderConfig::new("https://example.test", Duration::from_secs(1), 0)
            .with_api_key(Some("sk-secret".into()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn config_serializes_timeout_in_millis() {
        let config = ProviderConfig::new("http://localhost:11434", Duration::from_secs(60), 2);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["timeoutMs"], json!(60_000));
        assert_eq!(value["maxRetries"], json!(2));
    }
}
