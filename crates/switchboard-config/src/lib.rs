#![allow(clippy::must_use_candidate)]

pub mod catalog;
mod duration;
mod env;
mod loader;
pub mod providers;
pub mod resilience;
pub mod selection;
pub mod telemetry;

use indexmap::IndexMap;
use serde::Deserialize;

pub use catalog::*;
pub use env::split_list;
pub use loader::{ENV_ALLOWED_MODELS, ENV_MAX_RETRIES, ENV_RETRY_DELAY_MS, ENV_TIMEOUT_MS};
pub use providers::*;
pub use resilience::*;
pub use selection::*;
pub use telemetry::{ExportProtocol, ExporterConfig, LogFormat, TelemetryConfig};

/// Top-level switchboard configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Model selection configuration
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Outbound call resilience configuration
    #[serde(default)]
    pub resilience: ResilienceConfig,
    /// Provider credentials keyed by provider name
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

impl Config {
    /// Names of providers that have usable credentials
    pub fn credentialed_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|(_, provider)| provider.has_credentials())
            .map(|(name, _)| name.clone())
            .collect()
    }
}
