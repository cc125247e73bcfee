//! Process-wide factory for callers without a composition root
//!
//! Prefer constructing a [`ProviderFactory`] and passing it down; this
//! accessor exists for call sites that cannot thread one through.

use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::warn;

use super::factory::ProviderFactory;
use super::traits::CompletionProvider;
use crate::config::AiSettings;

static FACTORY: Lazy<ProviderFactory> = Lazy::new(|| match ProviderFactory::from_env() {
    Ok(factory) => factory,
    Err(err) => {
        warn!(error = %err, "Invalid AI configuration in environment, using defaults");
        ProviderFactory::new(AiSettings::default())
    }
});

/// Shared factory, initialised from the environment on first use.
pub fn global_factory() -> &'static ProviderFactory {
    &FACTORY
}

/// Adapter currently selected by the shared factory.
pub async fn current_provider() -> Arc<dyn CompletionProvider> {
    global_factory().get_provider().await
}
