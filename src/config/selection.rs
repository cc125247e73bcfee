//! # Provider Selection Configuration
//!
//! Types the [`ProviderFactory`](crate::model::ProviderFactory) owns to decide
//! which backend serves completion requests.
//!
//! | Kind | Accepted spellings | Availability probe |
//! |------|--------------------|--------------------|
//! | `Cloud` | `openrouter`, `cloud` | never |
//! | `Local` | `ollama`, `local` | never |
//! | `Auto` | `auto` | yes, see the factory docs |

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which backend the factory should hand out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openrouter", alias = "cloud")]
    Cloud,
    #[serde(rename = "ollama", alias = "local")]
    Local,
    #[default]
    Auto,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Cloud => "openrouter",
            ProviderKind::Local => "ollama",
            ProviderKind::Auto => "auto",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "openrouter" | "cloud" => Ok(ProviderKind::Cloud),
            "ollama" | "local" => Ok(ProviderKind::Local),
            "auto" | "" => Ok(ProviderKind::Auto),
            _ => Err(ConfigError::InvalidProvider {
                value: value.to_string(),
            }),
        }
    }
}

/// Factory state: the selection mode and the local-preference flag.
///
/// `prefer_local` is tri-state. Only an explicit `Some(false)` moves the
/// local daemon behind the cloud service during auto-selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryConfig {
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_local: Option<bool>,
}

impl FactoryConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            prefer_local: None,
        }
    }

    pub fn with_prefer_local(mut self, prefer_local: bool) -> Self {
        self.prefer_local = Some(prefer_local);
        self
    }

    /// Local daemon is probed first unless the flag is explicitly `false`.
    pub fn local_first(&self) -> bool {
        self.prefer_local != Some(false)
    }

    /// Overwrite only the fields present in `update`.
    pub fn merge(&mut self, update: FactoryConfigUpdate) {
        if let Some(provider) = update.provider {
            self.provider = provider;
        }
        if let Some(prefer_local) = update.prefer_local {
            self.prefer_local = Some(prefer_local);
        }
    }
}

/// Partial update for [`FactoryConfig`]; absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryConfigUpdate {
    pub provider: Option<ProviderKind>,
    pub prefer_local: Option<bool>,
}

impl FactoryConfigUpdate {
    pub fn provider(provider: ProviderKind) -> Self {
        Self {
            provider: Some(provider),
            prefer_local: None,
        }
    }

    pub fn prefer_local(prefer_local: bool) -> Self {
        Self {
            provider: None,
            prefer_local: Some(prefer_local),
        }
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_prefer_local(mut self, prefer_local: bool) -> Self {
        self.prefer_local = Some(prefer_local);
        self
    }
}
