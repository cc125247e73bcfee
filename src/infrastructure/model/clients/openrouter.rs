//! OpenRouter client implementation
//!
//! Hosted aggregator speaking the chat-completions protocol. Requires an API
//! key and two attribution headers (`HTTP-Referer`, `X-Title`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::base::HttpClientBase;
use super::stream::sse_chunks;
use crate::config::OpenRouterSettings;
use crate::constants::{OPENROUTER_MAX_RETRIES, OPENROUTER_NAME};
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::catalog;
use crate::infrastructure::model::retry::RetryPolicy;
use crate::infrastructure::model::traits::{ChunkStream, CompletionProvider};
use crate::infrastructure::model::types::{
    Completion, CompletionFailure, CompletionRequest, CompletionResult, ModelError, ModelInfo,
    ProviderConfig, StreamChunk, TokenUsage,
};

const COMPLETIONS_PATH: &str = "/chat/completions";

/// OpenRouter cloud adapter
#[derive(Clone)]
pub struct OpenRouterProvider {
    base: HttpClientBase,
    config: ProviderConfig,
    retry: RetryPolicy,
}

impl OpenRouterProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            base: HttpClientBase::new(OPENROUTER_NAME, config.base_url.clone()),
            retry: RetryPolicy::new(config.max_retries),
            config,
        }
    }

    /// Creates client from settings.
    pub fn from_settings(settings: &OpenRouterSettings) -> Self {
        Self::new(Self::default_config(settings))
    }

    pub fn default_config(settings: &OpenRouterSettings) -> ProviderConfig {
        ProviderConfig::new(&settings.base_url, settings.timeout, OPENROUTER_MAX_RETRIES)
            .with_api_key(settings.api_key.clone())
            .with_header("HTTP-Referer", &settings.app_url)
            .with_header("X-Title", &settings.app_title)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.base = HttpClientBase::with_client(OPENROUTER_NAME, self.config.base_url.clone(), http);
        self
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    fn missing_key_failure() -> CompletionResult {
        let err = ModelError::missing_api_key(OPENROUTER_NAME);
        warn!(provider = OPENROUTER_NAME, "Completion rejected: API key is not configured");
        CompletionFailure::from_error(err.to_string(), &err).into()
    }

    async fn send_once(
        &self,
        url: &str,
        api_key: &str,
        payload: &OpenRouterRequest,
    ) -> Result<OpenRouterResponse, ModelError> {
        let request = self.base.post_request(
            url,
            Some(api_key),
            &self.config.headers,
            payload,
            self.config.timeout,
        );
        self.base.send_json(request).await
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        OPENROUTER_NAME
    }

    async fn list_models(&self) -> Vec<ModelInfo> {
        catalog::openrouter_free_models()
    }

    async fn complete(&self, request: CompletionRequest) -> CompletionResult {
        let Some(api_key) = self.api_key() else {
            return Self::missing_key_failure();
        };
        if let Err(err) = request.validate(OPENROUTER_NAME) {
            warn!(provider = OPENROUTER_NAME, error = %err, "Completion rejected");
            return CompletionFailure::from_error(err.to_string(), &err).into();
        }

        let url = self.base.build_url(COMPLETIONS_PATH);
        let payload = OpenRouterRequest::from_request(&request, request.stream.unwrap_or(false));

        info!(
            provider = OPENROUTER_NAME,
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending request to OpenRouter"
        );

        let outcome = self
            .retry
            .run(OPENROUTER_NAME, || self.send_once(&url, api_key, &payload))
            .await;

        match outcome {
            Ok(response) => {
                debug!("Received response from OpenRouter");
                response.into_completion().into()
            }
            Err(err) => {
                warn!(provider = OPENROUTER_NAME, error = %err, "OpenRouter request failed");
                CompletionFailure::from_error(format!("Failed to connect to OpenRouter: {err}"), &err)
                    .into()
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.config.has_api_key()
    }

    fn get_config(&self) -> ProviderConfig {
        self.config.clone()
    }

    async fn complete_stream(&self, request: CompletionRequest) -> ChunkStream {
        let Some(api_key) = self.api_key() else {
            warn!(provider = OPENROUTER_NAME, "Stream rejected: API key is not configured");
            return Box::pin(futures::stream::once(async { StreamChunk::error() }));
        };
        if let Err(err) = request.validate(OPENROUTER_NAME) {
            warn!(provider = OPENROUTER_NAME, error = %err, "Stream rejected");
            return Box::pin(futures::stream::once(async { StreamChunk::error() }));
        }

        let url = self.base.build_url(COMPLETIONS_PATH);
        let payload = OpenRouterRequest::from_request(&request, true);
        info!(
            provider = OPENROUTER_NAME,
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Opening OpenRouter completion stream"
        );
        let builder = self.base.post_request(
            &url,
            Some(api_key),
            &self.config.headers,
            &payload,
            self.config.timeout,
        );
        sse_chunks(OPENROUTER_NAME, builder)
    }
}

#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

impl OpenRouterRequest {
    fn from_request(request: &CompletionRequest, stream: bool) -> Self {
        Self {
            model: request.model.clone(),
            messages: MessageAdapter::to_openai_format(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Option<Vec<OpenRouterChoice>>,
    usage: Option<OpenRouterUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: Option<OpenRouterMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

impl OpenRouterResponse {
    fn into_completion(self) -> Completion {
        let first = self.choices.into_iter().flatten().next();
        let finish_reason = first.as_ref().and_then(|c| c.finish_reason.clone());
        let content = first
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        let usage = self.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens.unwrap_or(0),
            completion_tokens: u.completion_tokens.unwrap_or(0),
            total_tokens: u.total_tokens.unwrap_or(0),
        });

        Completion {
            content,
            finish_reason,
            usage,
        }
    }
}
