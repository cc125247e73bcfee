//! Ollama client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::base::HttpClientBase;
use crate::config::OllamaSettings;
use crate::constants::{
    OLLAMA_DEFAULT_TEMPERATURE, OLLAMA_LIST_TIMEOUT, OLLAMA_MAX_RETRIES, OLLAMA_NAME,
    OLLAMA_PROBE_TIMEOUT, OLLAMA_TIMEOUT,
};
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::catalog;
use crate::infrastructure::model::retry::RetryPolicy;
use crate::infrastructure::model::traits::CompletionProvider;
use crate::infrastructure::model::types::{
    Completion, CompletionFailure, CompletionRequest, CompletionResult, ModelError, ModelInfo,
    ProviderConfig, TokenUsage,
};

const TAGS_PATH: &str = "/api/tags";
const CHAT_PATH: &str = "/api/chat";
const TIMEOUT_MESSAGE: &str = "Request timeout - the model took too long to respond";

/// Ollama client for local LLM
#[derive(Clone)]
pub struct OllamaProvider {
    base: HttpClientBase,
    config: ProviderConfig,
    retry: RetryPolicy,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            base: HttpClientBase::new(OLLAMA_NAME, config.base_url.clone()),
            retry: RetryPolicy::new(config.max_retries),
            config,
        }
    }

    /// Creates client from settings.
    pub fn from_settings(settings: &OllamaSettings) -> Self {
        Self::new(ProviderConfig::new(
            &settings.base_url,
            OLLAMA_TIMEOUT,
            OLLAMA_MAX_RETRIES,
        ))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.base = HttpClientBase::with_client(OLLAMA_NAME, self.config.base_url.clone(), http);
        self
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>, ModelError> {
        let url = self.base.build_url(TAGS_PATH);
        let response = self.base.get(&url, OLLAMA_LIST_TIMEOUT).await?;
        let response = self.base.check_status(response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(OLLAMA_NAME, e.to_string()))?;
        Ok(tags
            .models
            .iter()
            .map(|model| catalog::local_model(&model.name))
            .collect())
    }

    async fn send_once(&self, url: &str, payload: &OllamaRequest) -> Result<OllamaResponse, ModelError> {
        let request = self.base.post_request(
            url,
            None,
            &self.config.headers,
            payload,
            self.config.timeout,
        );
        self.base.send_json(request).await
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    fn name(&self) -> &str {
        OLLAMA_NAME
    }

    async fn list_models(&self) -> Vec<ModelInfo> {
        match self.fetch_models().await {
            Ok(models) => models,
            Err(err) => {
                debug!(error = %err, "Ollama model list unavailable, using fallback catalog");
                catalog::ollama_fallback_models()
            }
        }
    }

    async fn complete(&self, request: CompletionRequest) -> CompletionResult {
        if let Err(err) = request.validate(OLLAMA_NAME) {
            warn!(provider = OLLAMA_NAME, error = %err, "Completion rejected");
            return CompletionFailure::from_error(err.to_string(), &err).into();
        }

        let url = self.base.build_url(CHAT_PATH);
        let payload = OllamaRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_ollama_format(&request.messages),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature.unwrap_or(OLLAMA_DEFAULT_TEMPERATURE),
                num_predict: request.max_tokens,
            },
        };

        info!(
            provider = OLLAMA_NAME,
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending request to Ollama"
        );

        let outcome = self
            .retry
            .run(OLLAMA_NAME, || self.send_once(&url, &payload))
            .await;

        match outcome {
            Ok(response) => {
                debug!("Received response from Ollama");
                response.into_completion().into()
            }
            Err(err) if err.is_timeout() => {
                warn!(provider = OLLAMA_NAME, error = %err, "Ollama request timed out");
                CompletionFailure::from_error(TIMEOUT_MESSAGE, &err).into()
            }
            Err(err) => {
                warn!(provider = OLLAMA_NAME, error = %err, "Ollama request failed");
                CompletionFailure::from_error(format!("Failed to connect to Ollama: {err}"), &err)
                    .into()
            }
        }
    }

    async fn is_available(&self) -> bool {
        let url = self.base.build_url(TAGS_PATH);
        match self.base.get(&url, OLLAMA_PROBE_TIMEOUT).await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "Ollama is not reachable");
                false
            }
        }
    }

    fn get_config(&self) -> ProviderConfig {
        self.config.clone()
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaResponse {
    fn into_completion(self) -> Completion {
        let prompt_tokens = self.prompt_eval_count.unwrap_or(0);
        let completion_tokens = self.eval_count.unwrap_or(0);
        Completion {
            content: self.message.map(|m| m.content).unwrap_or_default(),
            finish_reason: Some(if self.done { "stop" } else { "length" }.to_string()),
            usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens.saturating_add(completion_tokens),
            }),
        }
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ChatMessage;
    use serde_json::json;

    #[test]
    fn from_settings_uses_local_defaults() {
        let provider = OllamaProvider::from_settings(&OllamaSettings::default());
        let config = provider.get_config();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.timeout.as_secs(), 60);
        assert_eq!(config.max_retries, 2);
        assert!(config.api_key.is_none());
        assert_eq!(provider.name(), "Ollama");
    }

    #[test]
    fn request_defaults_temperature_and_omits_num_predict() {
        let payload = OllamaRequest {
            model: "llama3.2".into(),
            messages: MessageAdapter::to_ollama_format(&[ChatMessage::user("Hi")]),
            stream: false,
            options: OllamaOptions {
                temperature: OLLAMA_DEFAULT_TEMPERATURE,
                num_predict: None,
            },
        };
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(value["stream"], json!(false));
        assert!(value["options"].get("num_predict").is_none());
        assert!((value["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn done_maps_to_stop_and_usage_is_summed() {
        let response: OllamaResponse = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": "Play the G major scale."},
            "done": true,
            "prompt_eval_count": 12,
            "eval_count": 30
        }))
        .unwrap();
        let completion = response.into_completion();
        assert_eq!(completion.content, "Play the G major scale.");
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
        assert_eq!(completion.usage.map(|u| u.total_tokens), Some(42));
    }

    #[test]
    fn oversized_counts_saturate_total() {
        let response: OllamaResponse = serde_json::from_value(json!({
            "message": {"content": "x"},
            "done": true,
            "prompt_eval_count": 4294967295u64,
            "eval_count": 1
        }))
        .unwrap();
        let usage = response.into_completion().usage.unwrap();
        assert_eq!(usage.total_tokens, u32::MAX);
    }

    #[test]
    fn unfinished_response_maps_to_length() {
        let response: OllamaResponse =
            serde_json::from_value(json!({"message": {"content": "Partial"}, "done": false})).unwrap();
        let completion = response.into_completion();
        assert_eq!(completion.finish_reason.as_deref(), Some("length"));
        assert_eq!(completion.usage, Some(TokenUsage::default()));
    }
}
