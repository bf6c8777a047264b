use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;

use crate::env::{non_empty_var, split_list};
use crate::providers::{PROVIDER_KEY_VARS, ProviderConfig};
use crate::Config;

/// Comma-separated model allowlist override
pub const ENV_ALLOWED_MODELS: &str = "SWITCHBOARD_ALLOWED_MODELS";
/// Retry count override
pub const ENV_MAX_RETRIES: &str = "SWITCHBOARD_MAX_RETRIES";
/// Retry base delay override in milliseconds
pub const ENV_RETRY_DELAY_MS: &str = "SWITCHBOARD_RETRY_DELAY_MS";
/// Per-attempt timeout override in milliseconds
pub const ENV_TIMEOUT_MS: &str = "SWITCHBOARD_TIMEOUT_MS";

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, parses,
    /// applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, expansion or parsing
    /// fails, an override is malformed, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus file access
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let mut config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Build configuration from defaults and the environment alone
    ///
    /// Registers every well-known provider whose API key variable is set.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is malformed or validation fails
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        for (provider, vars) in PROVIDER_KEY_VARS {
            if let Some(key) = vars.iter().find_map(|var| non_empty_var(var)) {
                config.providers.insert(
                    (*provider).to_owned(),
                    ProviderConfig {
                        api_key: Some(SecretString::from(key)),
                        base_url: None,
                    },
                );
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply `SWITCHBOARD_*` environment overrides to the resilience settings
    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Some(raw) = non_empty_var(ENV_ALLOWED_MODELS) {
            let models = split_list(&raw);
            if !models.is_empty() {
                self.resilience.allowed_models = models;
            }
        }

        if let Some(raw) = non_empty_var(ENV_MAX_RETRIES) {
            self.resilience.max_retries = raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid {ENV_MAX_RETRIES} '{raw}': {e}"))?;
        }

        if let Some(raw) = non_empty_var(ENV_RETRY_DELAY_MS) {
            self.resilience.retry_base_delay = parse_millis(ENV_RETRY_DELAY_MS, &raw)?;
        }

        if let Some(raw) = non_empty_var(ENV_TIMEOUT_MS) {
            self.resilience.timeout = parse_millis(ENV_TIMEOUT_MS, &raw)?;
        }

        Ok(())
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_catalog()?;
        self.validate_selection()?;
        self.validate_resilience()?;
        Ok(())
    }

    fn validate_catalog(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();

        for model in &self.catalog.models {
            if model.id.trim().is_empty() {
                anyhow::bail!("catalog model ids must not be empty");
            }
            if !seen.insert(model.id.as_str()) {
                anyhow::bail!("duplicate catalog model id '{}'", model.id);
            }
            if model.context_window == 0 {
                anyhow::bail!("catalog model '{}' has a zero context window", model.id);
            }
            if model.input_per_mtok < 0.0 || model.output_per_mtok < 0.0 {
                anyhow::bail!("catalog model '{}' has negative pricing", model.id);
            }
        }

        if !self.catalog.builtin && self.catalog.models.is_empty() {
            anyhow::bail!("catalog.builtin is disabled but no catalog.models are configured");
        }

        Ok(())
    }

    fn validate_selection(&self) -> anyhow::Result<()> {
        let weights = &self.selection.weights;

        if self.selection.max_reasons == 0 {
            anyhow::bail!("selection.max_reasons must be greater than 0");
        }
        if weights.context_overflow_penalty >= 0.0 {
            anyhow::bail!("selection.weights.context_overflow_penalty must be negative");
        }
        if weights.credentials_missing_penalty >= 0.0 {
            anyhow::bail!("selection.weights.credentials_missing_penalty must be negative");
        }

        Ok(())
    }

    fn validate_resilience(&self) -> anyhow::Result<()> {
        let resilience = &self.resilience;

        if resilience.allowed_models.is_empty() {
            anyhow::bail!("resilience.allowed_models must not be empty");
        }
        if resilience.timeout.is_zero() {
            anyhow::bail!("resilience.timeout must be greater than 0");
        }
        if resilience.retry_base_delay.is_zero() {
            anyhow::bail!("resilience.retry_base_delay must be greater than 0");
        }
        if resilience.backoff_multiplier.is_nan() || resilience.backoff_multiplier <= 1.0 {
            anyhow::bail!("resilience.backoff_multiplier must be greater than 1");
        }
        if resilience.max_retries > 10 {
            anyhow::bail!("resilience.max_retries exceeds maximum of 10");
        }

        Ok(())
    }
}

fn parse_millis(var: &str, raw: &str) -> anyhow::Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| anyhow::anyhow!("invalid {var} '{raw}': {e}"))
}
