//! Provider factory - selects, constructs and caches the active adapter

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::clients::{OllamaProvider, OpenRouterProvider};
use super::traits::CompletionProvider;
use crate::config::{AiSettings, ConfigError, FactoryConfig, FactoryConfigUpdate, ProviderKind};
use crate::constants::{OLLAMA_DISPLAY_NAME, OPENROUTER_DISPLAY_NAME};

/// Constructs adapters on demand.
///
/// Construction must be cheap and side-effect free; probing is done by the
/// factory, never by the builder.
pub trait ProviderBuilder: Send + Sync {
    fn build_cloud(&self) -> Arc<dyn CompletionProvider>;
    fn build_local(&self) -> Arc<dyn CompletionProvider>;
}

/// Builds the HTTP adapters from loaded settings.
#[derive(Debug, Clone)]
pub struct DefaultProviderBuilder {
    settings: AiSettings,
}

impl DefaultProviderBuilder {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }
}

impl ProviderBuilder for DefaultProviderBuilder {
    fn build_cloud(&self) -> Arc<dyn CompletionProvider> {
        Arc::new(OpenRouterProvider::from_settings(&self.settings.openrouter))
    }

    fn build_local(&self) -> Arc<dyn CompletionProvider> {
        Arc::new(OllamaProvider::from_settings(&self.settings.ollama))
    }
}

/// One row of [`ProviderFactory::get_available_providers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAvailability {
    pub display_name: String,
    pub available: bool,
}

struct FactoryState {
    config: FactoryConfig,
    cached: Option<Arc<dyn CompletionProvider>>,
}

/// Chooses which adapter serves completions and keeps it cached.
///
/// Config and cache share one async mutex that `get_provider` holds across
/// selection, so concurrent first callers construct a single adapter and a
/// concurrent `update_config`/`clear_cache` waits for it.
pub struct ProviderFactory {
    builder: Arc<dyn ProviderBuilder>,
    state: Mutex<FactoryState>,
}

impl fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFactory").finish_non_exhaustive()
    }
}

impl ProviderFactory {
    pub fn new(settings: AiSettings) -> Self {
        let config = settings.factory_config();
        Self::with_builder(config, Arc::new(DefaultProviderBuilder::new(settings)))
    }

    /// Factory configured from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(AiSettings::from_env()?))
    }

    pub fn with_builder(config: FactoryConfig, builder: Arc<dyn ProviderBuilder>) -> Self {
        Self {
            builder,
            state: Mutex::new(FactoryState {
                config,
                cached: None,
            }),
        }
    }

    pub async fn get_config(&self) -> FactoryConfig {
        self.state.lock().await.config
    }

    /// Merge `update` into the config. Always drops the cached adapter.
    pub async fn update_config(&self, update: FactoryConfigUpdate) {
        let mut state = self.state.lock().await;
        state.config.merge(update);
        state.cached = None;
        debug!(
            provider = %state.config.provider,
            prefer_local = ?state.config.prefer_local,
            "Provider config updated"
        );
    }

    pub async fn clear_cache(&self) {
        self.state.lock().await.cached = None;
        debug!("Provider cache cleared");
    }

    /// Cached adapter, or the result of a fresh selection.
    pub async fn get_provider(&self) -> Arc<dyn CompletionProvider> {
        let mut state = self.state.lock().await;
        if let Some(provider) = &state.cached {
            return Arc::clone(provider);
        }
        let provider = select_provider(self.builder.as_ref(), &state.config).await;
        state.cached = Some(Arc::clone(&provider));
        provider
    }

    /// Probe both backends concurrently. Local first, then cloud.
    pub async fn get_available_providers(&self) -> Vec<ProviderAvailability> {
        let local = self.builder.build_local();
        let cloud = self.builder.build_cloud();
        let (local_available, cloud_available) = tokio::join!(local.is_available(), cloud.is_available());

        vec![
            ProviderAvailability {
                display_name: OLLAMA_DISPLAY_NAME.to_string(),
                available: local_available,
            },
            ProviderAvailability {
                display_name: OPENROUTER_DISPLAY_NAME.to_string(),
                available: cloud_available,
            },
        ]
    }
}

async fn select_provider(
    builder: &dyn ProviderBuilder,
    config: &FactoryConfig,
) -> Arc<dyn CompletionProvider> {
    match config.provider {
        ProviderKind::Cloud => {
            info!("Using OpenRouter provider (explicit)");
            builder.build_cloud()
        }
        ProviderKind::Local => {
            info!("Using Ollama provider (explicit)");
            builder.build_local()
        }
        ProviderKind::Auto => select_auto(builder, config).await,
    }
}

async fn select_auto(
    builder: &dyn ProviderBuilder,
    config: &FactoryConfig,
) -> Arc<dyn CompletionProvider> {
    if config.local_first() {
        let local = builder.build_local();
        if local.is_available().await {
            info!("Using Ollama provider (auto-detected, local preferred)");
            return local;
        }
        debug!("Local provider unavailable, trying cloud");
    }

    let cloud = builder.build_cloud();
    if cloud.is_available().await {
        info!("Using OpenRouter provider (auto-detected)");
        return cloud;
    }

    if !config.local_first() {
        let local = builder.build_local();
        if local.is_available().await {
            info!("Using Ollama provider (auto-detected fallback)");
            return local;
        }
    }

    info!("No provider available, defaulting to OpenRouter");
    cloud
}
