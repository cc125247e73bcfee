//! Model infrastructure module
//!
//! # Structure
//! - `types` - Config, request, result and error types
//! - `traits` - CompletionProvider capability contract
//! - `adapter` - Message format adapters
//! - `retry` - Backoff policy for completion calls
//! - `catalog` - Static model catalogs
//! - `clients` - Individual backend implementations
//! - `factory` - Provider selection and caching
//! - `global` - Lazily initialised shared factory

pub mod adapter;
pub mod catalog;
pub mod clients;
pub mod factory;
pub mod global;
pub mod retry;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use clients::{OllamaProvider, OpenRouterProvider};
pub use factory::{DefaultProviderBuilder, ProviderAvailability, ProviderBuilder, ProviderFactory};
pub use global::{current_provider, global_factory};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use traits::{ChunkStream, CompletionProvider};
pub use types::{
    Completion, CompletionFailure, CompletionRequest, CompletionResult, ModelError, ModelInfo,
    ProviderConfig, StreamChunk, TokenUsage, TransportKind,
};
