//! Model clients

mod base;
mod ollama;
mod openrouter;
mod stream;

pub use base::HttpClientBase;
pub use ollama::OllamaProvider;
pub use openrouter::OpenRouterProvider;
pub use stream::{SseAccumulator, sse_chunks};
