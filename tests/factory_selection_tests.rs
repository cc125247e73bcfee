// Provider factory tests - selection algorithm, caching and availability probes
//
// Adapters are stubs built by a counting builder so every construction and
// probe can be asserted without touching the network.

use async_trait::async_trait;
use guitar_crm_ai::config::{FactoryConfig, FactoryConfigUpdate, ProviderKind};
use guitar_crm_ai::model::{
    Completion, CompletionProvider, CompletionRequest, CompletionResult, ModelInfo,
    ProviderAvailability, ProviderBuilder, ProviderConfig, ProviderFactory,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

struct StubProvider {
    name: &'static str,
    available: AtomicBool,
    probes: AtomicUsize,
}

impl StubProvider {
    fn new(name: &'static str, available: bool) -> Self {
        Self {
            name,
            available: AtomicBool::new(available),
            probes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn list_models(&self) -> Vec<ModelInfo> {
        Vec::new()
    }

    async fn complete(&self, _request: CompletionRequest) -> CompletionResult {
        Completion {
            content: format!("from {}", self.name),
            finish_reason: Some("stop".into()),
            usage: None,
        }
        .into()
    }

    async fn is_available(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.available.load(Ordering::SeqCst)
    }

    fn get_config(&self) -> ProviderConfig {
        ProviderConfig::new("http://stub.invalid", Duration::from_secs(1), 0)
    }
}

/// Hands out the same two stubs and counts constructions.
struct CountingBuilder {
    cloud: Arc<StubProvider>,
    local: Arc<StubProvider>,
    cloud_built: AtomicUsize,
    local_built: AtomicUsize,
}

impl CountingBuilder {
    fn new(cloud_available: bool, local_available: bool) -> Arc<Self> {
        Arc::new(Self {
            cloud: Arc::new(StubProvider::new("OpenRouter", cloud_available)),
            local: Arc::new(StubProvider::new("Ollama", local_available)),
            cloud_built: AtomicUsize::new(0),
            local_built: AtomicUsize::new(0),
        })
    }

    fn built(&self) -> usize {
        self.cloud_built.load(Ordering::SeqCst) + self.local_built.load(Ordering::SeqCst)
    }

    fn cloud_probes(&self) -> usize {
        self.cloud.probes.load(Ordering::SeqCst)
    }

    fn local_probes(&self) -> usize {
        self.local.probes.load(Ordering::SeqCst)
    }
}

impl ProviderBuilder for CountingBuilder {
    fn build_cloud(&self) -> Arc<dyn CompletionProvider> {
        self.cloud_built.fetch_add(1, Ordering::SeqCst);
        self.cloud.clone()
    }

    fn build_local(&self) -> Arc<dyn CompletionProvider> {
        self.local_built.fetch_add(1, Ordering::SeqCst);
        self.local.clone()
    }
}

fn factory(config: FactoryConfig, builder: &Arc<CountingBuilder>) -> ProviderFactory {
    ProviderFactory::with_builder(config, builder.clone())
}

#[tokio::test]
async fn explicit_kind_skips_probes() {
    for (kind, expected) in [(ProviderKind::Cloud, "OpenRouter"), (ProviderKind::Local, "Ollama")] {
        let builder = CountingBuilder::new(false, false);
        let factory = factory(FactoryConfig::new(kind), &builder);

        let provider = factory.get_provider().await;

        assert_eq!(provider.name(), expected);
        assert_eq!(builder.cloud_probes(), 0);
        assert_eq!(builder.local_probes(), 0);
    }
}

#[tokio::test]
async fn repeated_calls_return_cached_instance() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Cloud), &builder);

    let first = factory.get_provider().await;
    let second = factory.get_provider().await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builder.built(), 1);
}

#[tokio::test]
async fn clear_cache_forces_one_new_construction() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Cloud), &builder);

    factory.get_provider().await;
    factory.clear_cache().await;
    factory.get_provider().await;

    assert_eq!(builder.built(), 2);
}

#[tokio::test]
async fn empty_update_still_invalidates_cache() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Local), &builder);

    factory.get_provider().await;
    factory.update_config(FactoryConfigUpdate::default()).await;
    factory.get_provider().await;

    assert_eq!(builder.built(), 2);
    assert_eq!(factory.get_config().await, FactoryConfig::new(ProviderKind::Local));
}

#[tokio::test]
async fn update_config_switches_provider() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Cloud), &builder);

    assert_eq!(factory.get_provider().await.name(), "OpenRouter");
    factory
        .update_config(FactoryConfigUpdate::provider(ProviderKind::Local))
        .await;
    assert_eq!(factory.get_provider().await.name(), "Ollama");
}

#[tokio::test]
async fn auto_prefers_available_local_without_probing_cloud() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(
        FactoryConfig::new(ProviderKind::Auto).with_prefer_local(true),
        &builder,
    );

    let provider = factory.get_provider().await;

    assert_eq!(provider.name(), "Ollama");
    assert_eq!(builder.local_probes(), 1);
    assert_eq!(builder.cloud_probes(), 0);
}

#[tokio::test]
async fn auto_default_prefers_local() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Auto), &builder);

    assert_eq!(factory.get_provider().await.name(), "Ollama");
    assert_eq!(builder.cloud_probes(), 0);
}

#[tokio::test]
async fn auto_falls_through_to_cloud_when_local_is_down() {
    let builder = CountingBuilder::new(true, false);
    let factory = factory(
        FactoryConfig::new(ProviderKind::Auto).with_prefer_local(true),
        &builder,
    );

    assert_eq!(factory.get_provider().await.name(), "OpenRouter");
    assert_eq!(builder.local_probes(), 1);
    assert_eq!(builder.cloud_probes(), 1);
}

#[tokio::test]
async fn auto_cloud_first_falls_back_to_local() {
    let builder = CountingBuilder::new(false, true);
    let factory = factory(
        FactoryConfig::new(ProviderKind::Auto).with_prefer_local(false),
        &builder,
    );

    assert_eq!(factory.get_provider().await.name(), "Ollama");
    assert_eq!(builder.cloud_probes(), 1);
    assert_eq!(builder.local_probes(), 1);
}

#[tokio::test]
async fn auto_cloud_first_picks_cloud_without_probing_local() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(
        FactoryConfig::new(ProviderKind::Auto).with_prefer_local(false),
        &builder,
    );

    assert_eq!(factory.get_provider().await.name(), "OpenRouter");
    assert_eq!(builder.local_probes(), 0);
}

#[tokio::test]
async fn auto_defaults_to_cloud_when_nothing_is_available() {
    for prefer_local in [true, false] {
        let builder = CountingBuilder::new(false, false);
        let factory = factory(
            FactoryConfig::new(ProviderKind::Auto).with_prefer_local(prefer_local),
            &builder,
        );

        assert_eq!(factory.get_provider().await.name(), "OpenRouter");
    }
}

#[tokio::test]
async fn available_providers_lists_both_backends() {
    let builder = CountingBuilder::new(false, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Auto), &builder);

    let providers = factory.get_available_providers().await;

    assert_eq!(
        providers,
        vec![
            ProviderAvailability {
                display_name: "Ollama (Local)".into(),
                available: true,
            },
            ProviderAvailability {
                display_name: "OpenRouter (Cloud)".into(),
                available: false,
            },
        ]
    );
    assert_eq!(builder.local_probes(), 1);
    assert_eq!(builder.cloud_probes(), 1);
}

#[tokio::test(start_paused = true)]
async fn available_providers_probes_concurrently() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Auto), &builder);

    let started = tokio::time::Instant::now();
    factory.get_available_providers().await;

    // Each stub probe sleeps 50ms; sequential probing would take 100ms.
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn availability_report_does_not_touch_cache() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Cloud), &builder);

    let cached = factory.get_provider().await;
    factory.get_available_providers().await;

    assert!(Arc::ptr_eq(&cached, &factory.get_provider().await));
}

#[tokio::test]
async fn selection_is_not_repeated_when_availability_changes() {
    let builder = CountingBuilder::new(true, true);
    let factory = factory(FactoryConfig::new(ProviderKind::Auto), &builder);

    assert_eq!(factory.get_provider().await.name(), "Ollama");
    builder.local.available.store(false, Ordering::SeqCst);
    assert_eq!(factory.get_provider().await.name(), "Ollama");

    factory.clear_cache().await;
    assert_eq!(factory.get_provider().await.name(), "OpenRouter");
}
