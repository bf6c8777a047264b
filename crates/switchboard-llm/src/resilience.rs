//! Allowlist, per-attempt timeout, and retry with exponential backoff
//!
//! [`ResilienceHarness::execute`] wraps exactly one logical provider call.
//! The model is checked against the [`ModelAllowlist`] before anything
//! runs; a rejected model never reaches the network.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use switchboard_config::ResilienceConfig;
use switchboard_routing::Provider;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// Set of model identifiers permitted to be invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAllowlist {
    models: HashSet<String>,
}

impl ModelAllowlist {
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains(model)
    }

    /// `ModelNotAllowed` unless the model is listed
    pub fn check(&self, model: &str) -> Result<(), LlmError> {
        if self.contains(model) {
            Ok(())
        } else {
            Err(LlmError::ModelNotAllowed { model: model.to_owned() })
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelAllowlist {
    fn default() -> Self {
        Self::new(switchboard_config::DEFAULT_ALLOWED_MODELS.iter().copied())
    }
}

/// How one call is attempted
#[derive(Debug, Clone, PartialEq)]
pub struct CallPolicy {
    pub provider: Provider,
    pub model: String,
    /// Operation name for logs, e.g. "generate_text"
    pub operation: &'static str,
    /// Hard limit on each attempt
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub retry_delay: Duration,
    /// Growth factor for each further retry, greater than 1
    pub multiplier: f64,
}

impl CallPolicy {
    /// Wait before retry `retry` (1-based): `retry_delay * multiplier^(retry - 1)`
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.retry_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Upper bound on calls made under this policy
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Successful outcome of a harnessed call
#[derive(Debug, Clone, PartialEq)]
pub struct Execution<T> {
    pub value: T,
    /// Attempts made, including the successful one
    pub attempts: u32,
    /// Wall-clock time across every attempt and backoff wait
    pub elapsed: Duration,
}

/// Applies the allowlist, timeouts, and retries to outbound calls
#[derive(Debug, Clone)]
pub struct ResilienceHarness {
    allowlist: ModelAllowlist,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    multiplier: f64,
}

impl Default for ResilienceHarness {
    fn default() -> Self {
        Self::new(&ResilienceConfig::default())
    }
}

impl ResilienceHarness {
    pub fn new(config: &ResilienceConfig) -> Self {
        Self {
            allowlist: ModelAllowlist::new(config.allowed_models.iter().cloned()),
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_delay: config.retry_base_delay,
            multiplier: config.backoff_multiplier,
        }
    }

    pub const fn allowlist(&self) -> &ModelAllowlist {
        &self.allowlist
    }

    /// Policy for one call using the configured tunables
    pub fn policy(&self, provider: Provider, model: impl Into<String>, operation: &'static str) -> CallPolicy {
        CallPolicy {
            provider,
            model: model.into(),
            operation,
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            multiplier: self.multiplier,
        }
    }

    /// Run `call` under `policy`
    ///
    /// `call` receives the 1-based attempt number. Transient failures and
    /// attempt timeouts are retried until the budget is spent, then surface
    /// as `RetriesExhausted` carrying the last cause. Other failures return
    /// immediately. Cancellation is observed during attempts and backoff
    /// waits and is never retried.
    pub async fn execute<T, F, Fut>(
        &self,
        policy: &CallPolicy,
        cancel: &CancellationToken,
        mut call: F,
    ) -> Result<Execution<T>, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        self.allowlist.check(&policy.model).inspect_err(|_| {
            tracing::warn!(
                provider = %policy.provider,
                model = %policy.model,
                operation = policy.operation,
                "model rejected by allowlist"
            );
        })?;

        let start = Instant::now();
        let max_attempts = policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            if cancel.is_cancelled() {
                return Err(LlmError::Cancelled);
            }

            let attempt_start = Instant::now();
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(LlmError::Cancelled),
                result = tokio::time::timeout(policy.timeout, call(attempt)) => {
                    result.unwrap_or(Err(LlmError::Timeout { timeout: policy.timeout }))
                }
            };
            let latency_ms = attempt_start.elapsed().as_millis();

            let error = match outcome {
                Ok(value) => {
                    tracing::debug!(
                        provider = %policy.provider,
                        model = %policy.model,
                        operation = policy.operation,
                        attempt,
                        latency_ms,
                        outcome = "success",
                        "provider call succeeded"
                    );
                    return Ok(Execution {
                        value,
                        attempts: attempt,
                        elapsed: start.elapsed(),
                    });
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                tracing::warn!(
                    provider = %policy.provider,
                    model = %policy.model,
                    operation = policy.operation,
                    attempt,
                    latency_ms,
                    outcome = %error.kind(),
                    error = %error,
                    "provider call failed"
                );
                return Err(error);
            }

            if attempt >= max_attempts {
                tracing::warn!(
                    provider = %policy.provider,
                    model = %policy.model,
                    operation = policy.operation,
                    attempt,
                    latency_ms,
                    outcome = "exhausted",
                    error = %error,
                    "provider call failed, retries exhausted"
                );
                return Err(LlmError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = policy.backoff_delay(attempt);
            tracing::info!(
                provider = %policy.provider,
                model = %policy.model,
                operation = policy.operation,
                attempt,
                latency_ms,
                outcome = "transient",
                error = %error,
                backoff_ms = delay.as_millis(),
                "provider call failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(LlmError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}
