//! Model traits

use super::types::{
    CompletionRequest, CompletionResult, ModelInfo, ProviderConfig, StreamChunk,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};

/// Stream of completion chunks; dropping it cancels the underlying request.
pub type ChunkStream = BoxStream<'static, StreamChunk>;

/// Capability contract every completion backend implements.
///
/// None of the operations fail: enumeration and probing degrade to safe
/// defaults, and completion failures are captured in [`CompletionResult`].
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Backend name, e.g. `"OpenRouter"` or `"Ollama"`
    fn name(&self) -> &str;

    /// Models this backend can serve, or a static catalog when enumeration fails
    async fn list_models(&self) -> Vec<ModelInfo>;

    /// Run a chat completion
    async fn complete(&self, request: CompletionRequest) -> CompletionResult;

    /// Cheap liveness/configuration probe used for routing
    async fn is_available(&self) -> bool;

    /// Copy of the adapter configuration
    fn get_config(&self) -> ProviderConfig;

    /// Stream a chat completion.
    ///
    /// Backends without native streaming run [`complete`](Self::complete) and
    /// emit a single terminal chunk.
    async fn complete_stream(&self, request: CompletionRequest) -> ChunkStream {
        let chunk = match self.complete(request).await {
            CompletionResult::Success(completion) => StreamChunk {
                content: completion.content,
                reasoning: None,
                usage: completion.usage,
                finish_reason: completion.finish_reason.or_else(|| Some("stop".to_string())),
                done: true,
            },
            CompletionResult::Failure(_) => StreamChunk::error(),
        };
        Box::pin(stream::once(async move { chunk }))
    }
}
