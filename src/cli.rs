use clap::{Args, Parser, Subcommand};

use crate::config::{FactoryConfigUpdate, ProviderKind};

#[derive(Parser, Debug)]
#[command(
    name = "guitar-crm-ai",
    version,
    about = "Inspect and exercise the AI completion providers"
)]
pub struct Cli {
    /// TOML settings file; the environment still overrides it
    #[arg(long)]
    pub config: Option<String>,
    /// Force a backend: openrouter, ollama or auto
    #[arg(long)]
    pub provider: Option<ProviderKind>,
    /// Probe the local daemon before the cloud service in auto mode
    #[arg(long)]
    pub prefer_local: Option<bool>,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Selection overrides given on the command line, if any.
    pub fn selection_override(&self) -> Option<FactoryConfigUpdate> {
        if self.provider.is_none() && self.prefer_local.is_none() {
            return None;
        }
        Some(FactoryConfigUpdate {
            provider: self.provider,
            prefer_local: self.prefer_local,
        })
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Probe both backends and print their availability
    Providers,
    /// List the models of the selected backend
    Models,
    /// Send one prompt to the selected backend
    Complete(CompleteArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CompleteArgs {
    /// Model id; defaults to the first catalog entry of the selected backend
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Print chunks as they arrive instead of the final JSON result
    #[arg(long)]
    pub stream: bool,
    #[arg(required = true)]
    pub prompt: Vec<String>,
}
