pub mod error;
pub mod loader;
pub mod selection;
pub mod settings;

pub use error::ConfigError;
pub use selection::{FactoryConfig, FactoryConfigUpdate, ProviderKind};
pub use settings::{AiSettings, OllamaSettings, OpenRouterSettings};
