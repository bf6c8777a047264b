//! Programmatic configuration builder for integration tests

use std::time::Duration;

use secrecy::SecretString;
use switchboard_config::{Config, ProviderConfig, ResilienceConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with fast resilience defaults and no providers
    pub fn new() -> Self {
        Self {
            config: Config {
                resilience: ResilienceConfig {
                    max_retries: 2,
                    retry_base_delay: Duration::from_millis(20),
                    backoff_multiplier: 2.0,
                    timeout: Duration::from_secs(5),
                    ..ResilienceConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Add a provider pointed at a mock backend
    pub fn with_provider(mut self, name: &str, base_url: &str) -> Self {
        self.config.providers.insert(
            name.to_owned(),
            ProviderConfig {
                api_key: Some(SecretString::from("test-key")),
                base_url: Some(base_url.parse().expect("valid URL")),
            },
        );
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.resilience.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.config.resilience.retry_base_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.resilience.timeout = timeout;
        self
    }

    pub fn with_allowed_models(mut self, models: &[&str]) -> Self {
        self.config.resilience.allowed_models = models.iter().map(|m| (*m).to_owned()).collect();
        self
    }

    /// Consume the builder and return the config
    pub fn build(self) -> Config {
        self.config
    }
}
