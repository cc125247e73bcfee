pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use cli::{Cli, Command, CompleteArgs};
pub use config::{AiSettings, ConfigError, FactoryConfig, FactoryConfigUpdate, ProviderKind};
pub use domain::types;
pub use infrastructure::model;

use domain::types::ChatMessage;
use futures::StreamExt;
use model::{CompletionProvider, CompletionRequest, ProviderFactory};
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    debug!(
        command = ?cli.command,
        config = ?cli.config,
        provider = ?cli.provider,
        prefer_local = ?cli.prefer_local,
        "CLI arguments parsed"
    );

    let config_path = cli.config.as_deref().map(Path::new);
    let settings = AiSettings::load(config_path)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    }

    let factory = ProviderFactory::new(settings);
    if let Some(update) = cli.selection_override() {
        factory.update_config(update).await;
    }

    match cli.command {
        Command::Providers => print_providers(&factory).await,
        Command::Models => {
            let provider = factory.get_provider().await;
            let models = provider.list_models().await;
            println!("{}", serde_json::to_string_pretty(&models)?);
            Ok(())
        }
        Command::Complete(args) => complete(&factory, args).await,
    }
}

async fn print_providers(factory: &ProviderFactory) -> Result<(), Box<dyn Error>> {
    let rows = factory.get_available_providers().await;
    let mut stdout = io::stdout().lock();
    for row in rows {
        let status = if row.available { "available" } else { "unavailable" };
        writeln!(stdout, "{:<20} {status}", row.display_name)?;
    }
    Ok(())
}

async fn complete(factory: &ProviderFactory, args: CompleteArgs) -> Result<(), Box<dyn Error>> {
    let provider = factory.get_provider().await;
    let model = match args.model {
        Some(model) => model,
        None => default_model(provider.as_ref()).await?,
    };

    let mut messages = Vec::new();
    if let Some(system) = args.system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(args.prompt.join(" ")));

    let mut request = CompletionRequest::new(model, messages);
    request.temperature = args.temperature;
    request.max_tokens = args.max_tokens;
    info!(
        provider = provider.name(),
        model = request.model.as_str(),
        stream = args.stream,
        "Running completion"
    );

    if args.stream {
        let mut chunks = provider.complete_stream(request).await;
        let mut stdout = io::stdout();
        while let Some(chunk) = chunks.next().await {
            write!(stdout, "{}", chunk.content)?;
            stdout.flush()?;
            if chunk.done {
                writeln!(stdout)?;
                if chunk.finish_reason.as_deref() == Some("error") {
                    return Err("stream ended with an error".into());
                }
                break;
            }
        }
        return Ok(());
    }

    let result = provider.complete(request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    match result.error_message() {
        Some(message) => Err(message.to_string().into()),
        None => Ok(()),
    }
}

async fn default_model(provider: &dyn CompletionProvider) -> Result<String, Box<dyn Error>> {
    provider
        .list_models()
        .await
        .into_iter()
        .next()
        .map(|model| model.id)
        .ok_or_else(|| format!("{} offers no models", provider.name()).into())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr)
            .init();
    });
}
