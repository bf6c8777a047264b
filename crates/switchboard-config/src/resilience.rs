use std::time::Duration;

use serde::Deserialize;

/// Models permitted when no allowlist is configured
pub const DEFAULT_ALLOWED_MODELS: &[&str] = &[
    "gpt-4o-mini",
    "gpt-4o",
    "claude-3-5-haiku-20241022",
    "claude-3-5-sonnet-20241022",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Outbound call resilience tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResilienceConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry (e.g. "500ms")
    #[serde(default = "default_retry_base_delay", with = "crate::duration")]
    pub retry_base_delay: Duration,
    /// Growth factor applied to the delay on each further retry
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Per-attempt timeout (e.g. "45s")
    #[serde(default = "default_timeout", with = "crate::duration")]
    pub timeout: Duration,
    /// Model identifiers permitted to be invoked
    #[serde(default = "default_allowed_models")]
    pub allowed_models: Vec<String>,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_base_delay: default_retry_base_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            timeout: default_timeout(),
            allowed_models: default_allowed_models(),
        }
    }
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_retry_base_delay() -> Duration {
    Duration::from_millis(500)
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_timeout() -> Duration {
    Duration::from_secs(45)
}

fn default_allowed_models() -> Vec<String> {
    DEFAULT_ALLOWED_MODELS.iter().map(|m| (*m).to_owned()).collect()
}
