//! Dispatch orchestration
//!
//! A dispatch runs strictly in order: validate, select or look up the
//! model, build the native call, execute it through the resilience
//! harness, normalize, then price it. Harness failures propagate
//! unchanged.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;
use switchboard_config::{Config, Tier};
use switchboard_routing::{
    CatalogHandle, Cost, ModelCatalog, ModelDescriptor, Provider, Recommendation, RequiredCapabilities,
    RoutingError, SelectionCriteria, SelectionEngine, classify_prompt, estimate_cost, estimate_tokens,
};
use switchboard_telemetry::{DispatchMetrics, DispatchRecord};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::convert::build_call;
use crate::error::LlmError;
use crate::normalize::{ContentFormat, FinishReason, TokenUsage, normalize};
use crate::request::{DispatchRequest, GenerationRequest, OutputFormat};
use crate::resilience::ResilienceHarness;
use crate::transport::Transport;

/// Operation name reported by the harness
const OPERATION: &str = "generate_text";

/// Normalized response plus cost and latency
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub content: String,
    pub format: ContentFormat,
    pub tokens: TokenUsage,
    pub finish_reason: FinishReason,
    /// USD
    pub cost: Cost,
    /// Wall-clock time across the whole dispatch
    #[serde(rename = "latencyMs", serialize_with = "serialize_millis")]
    pub latency: Duration,
    /// Catalog id of the model that served the request
    pub model: String,
    pub provider: Provider,
    /// Provider attempts, including the successful one
    pub attempts: u32,
    /// `tokens` is a character-count estimate because the provider sent no usage
    pub usage_estimated: bool,
    /// Model name the provider reported, when it differs from the catalog id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_model: Option<String>,
    /// Original provider payload
    #[serde(skip)]
    pub raw: Value,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}

/// Result of dispatching one request to one model during a comparison
#[derive(Debug)]
pub struct ComparisonOutcome {
    pub model: String,
    pub result: Result<DispatchResult, LlmError>,
}

/// Per-model outcomes of a comparison, in the order the models were given
#[derive(Debug)]
pub struct ComparisonReport {
    pub outcomes: Vec<ComparisonOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl ComparisonReport {
    fn new(outcomes: Vec<ComparisonOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        Self {
            failed: outcomes.len() - succeeded,
            succeeded,
            outcomes,
        }
    }

    /// Successful result with the lowest total cost
    pub fn cheapest(&self) -> Option<&DispatchResult> {
        self.successes().min_by(|a, b| a.cost.total.total_cmp(&b.cost.total))
    }

    /// Successful result with the lowest latency
    pub fn fastest(&self) -> Option<&DispatchResult> {
        self.successes().min_by_key(|r| r.latency)
    }

    fn successes(&self) -> impl Iterator<Item = &DispatchResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// Routes generation requests to providers
#[derive(Clone)]
pub struct Dispatcher {
    catalog: CatalogHandle,
    engine: Arc<SelectionEngine>,
    harness: Arc<ResilienceHarness>,
    transport: Arc<dyn Transport>,
    credentials: Arc<HashSet<Provider>>,
    default_tier: Tier,
    metrics: DispatchMetrics,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("models", &self.catalog.snapshot().len())
            .field("credentials", &self.credentials)
            .field("default_tier", &self.default_tier)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Build a dispatcher from configuration
    ///
    /// Credentials are taken from the providers that have an API key configured.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self, LlmError> {
        let catalog = ModelCatalog::from_config(&config.catalog)?;
        let engine = SelectionEngine::new(&config.selection)?;
        let credentials = config
            .credentialed_providers()
            .iter()
            .map(|name| Provider::from(name.as_str()))
            .collect();

        Ok(Self::new(
            CatalogHandle::new(catalog),
            engine,
            ResilienceHarness::new(&config.resilience),
            transport,
            credentials,
        )
        .with_default_tier(config.selection.subscription_tier))
    }

    pub fn new(
        catalog: CatalogHandle,
        engine: SelectionEngine,
        harness: ResilienceHarness,
        transport: Arc<dyn Transport>,
        credentials: HashSet<Provider>,
    ) -> Self {
        Self {
            catalog,
            engine: Arc::new(engine),
            harness: Arc::new(harness),
            transport,
            credentials: Arc::new(credentials),
            default_tier: Tier::default(),
            metrics: DispatchMetrics::new(),
        }
    }

    /// Subscription tier assumed when a request carries none
    #[must_use]
    pub const fn with_default_tier(mut self, tier: Tier) -> Self {
        self.default_tier = tier;
        self
    }

    pub const fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    pub fn harness(&self) -> &ResilienceHarness {
        &self.harness
    }

    pub fn credentials(&self) -> &HashSet<Provider> {
        &self.credentials
    }

    /// Selection criteria derived from a request
    pub fn criteria(&self, request: &DispatchRequest) -> SelectionCriteria {
        let system_chars = request.system_prompt.as_deref().map_or(0, |s| s.chars().count());

        SelectionCriteria {
            task: request.task.unwrap_or_else(|| classify_prompt(&request.prompt)),
            prompt_chars: request.prompt.chars().count() + system_chars,
            max_output_tokens: request.max_output_tokens(),
            required: RequiredCapabilities {
                vision: request.require_vision,
                json: request.output_format == OutputFormat::Json,
            },
            subscription_tier: request.subscription_tier.unwrap_or(self.default_tier),
            credentials: (*self.credentials).clone(),
            priorities: request.priorities,
            preferred_model: request.preferred_model.clone(),
        }
    }

    /// Ranked recommendations for a request, without dispatching
    pub fn recommend(&self, request: &DispatchRequest, n: usize) -> Result<Vec<Recommendation>, LlmError> {
        request.validate()?;
        let catalog = self.catalog.snapshot();
        Ok(self.engine.select_top(&catalog, &self.criteria(request), n)?)
    }

    /// Dispatch a request with no external cancellation
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResult, LlmError> {
        self.dispatch_with_cancel(request, &CancellationToken::new()).await
    }

    /// Dispatch a request, aborting when `cancel` fires
    pub async fn dispatch_with_cancel(
        &self,
        request: &DispatchRequest,
        cancel: &CancellationToken,
    ) -> Result<DispatchResult, LlmError> {
        let start = Instant::now();
        let result = self.run(request, cancel, start).await;

        if let Err(e) = &result {
            tracing::warn!(
                model = request.model.as_deref().unwrap_or("auto"),
                kind = %e.kind(),
                error = %e,
                "dispatch failed"
            );
            self.metrics.record(&DispatchRecord {
                provider: "",
                model: request.model.as_deref().unwrap_or(""),
                outcome: e.kind().as_str(),
                duration: start.elapsed(),
                attempts: attempts_of(e),
                cost: 0.0,
                input_tokens: 0,
                output_tokens: 0,
            });
        }

        result
    }

    async fn run(
        &self,
        request: &DispatchRequest,
        cancel: &CancellationToken,
        start: Instant,
    ) -> Result<DispatchResult, LlmError> {
        request.validate()?;

        let catalog = self.catalog.snapshot();
        let model = self.resolve_model(&catalog, request)?;

        if !self.credentials.contains(&model.provider) {
            return Err(LlmError::MissingCredential {
                provider: model.provider.to_string(),
            });
        }

        let max_tokens = request.max_output_tokens().min(model.max_output_tokens);
        let generation = GenerationRequest {
            model: model.id.clone(),
            prompt: request.prompt.clone(),
            system_prompt: request.system_prompt.clone(),
            temperature: request.temperature(),
            max_tokens,
            output_format: request.output_format,
            native_json: model.capabilities.json_mode,
        };
        let call = build_call(&model.provider, &generation)?;

        let policy = self.harness.policy(model.provider.clone(), model.id.clone(), OPERATION);
        let transport = &self.transport;
        let call = &call;
        let execution = self.harness.execute(&policy, cancel, |_| transport.send(call)).await?;

        let response = normalize(execution.value, Some(model.provider.family()));

        let (tokens, usage_estimated) = match response.usage {
            Some(usage) => (usage, false),
            None => {
                let input_chars = generation.prompt.chars().count()
                    + generation.effective_system_prompt().map_or(0, |s| s.chars().count());
                let input = estimate_tokens(input_chars);
                let output = estimate_tokens(response.content.chars().count());
                (TokenUsage::new(input, output, None), true)
            }
        };

        let cost = estimate_cost(&model, tokens.input, tokens.output);
        let latency = start.elapsed();

        tracing::info!(
            provider = %model.provider,
            model = %model.id,
            attempts = execution.attempts,
            latency_ms = latency.as_millis(),
            input_tokens = tokens.input,
            output_tokens = tokens.output,
            cost_usd = cost.total,
            "dispatch completed"
        );

        self.metrics.record(&DispatchRecord {
            provider: model.provider.as_str(),
            model: &model.id,
            outcome: "success",
            duration: latency,
            attempts: execution.attempts,
            cost: cost.total,
            input_tokens: tokens.input,
            output_tokens: tokens.output,
        });

        Ok(DispatchResult {
            content: response.content,
            format: response.format,
            tokens,
            finish_reason: response.finish_reason,
            cost,
            latency,
            reported_model: response.model.filter(|reported| *reported != model.id),
            model: model.id.clone(),
            provider: model.provider.clone(),
            attempts: execution.attempts,
            usage_estimated,
            raw: response.raw,
        })
    }

    /// Explicit model from the catalog, or the best automatic pick
    ///
    /// Automatic selection takes the highest-ranked model that is both
    /// allowlisted and credentialed.
    fn resolve_model(&self, catalog: &ModelCatalog, request: &DispatchRequest) -> Result<Arc<ModelDescriptor>, LlmError> {
        if let Some(id) = request.model.as_deref() {
            let model = catalog.get(id.trim())?;
            if !model.is_available() {
                return Err(LlmError::ModelSunset { model: model.id.clone() });
            }
            return Ok(Arc::clone(model));
        }

        let criteria = self.criteria(request);
        let ranked = self.engine.select_top(catalog, &criteria, catalog.len())?;
        let allowlist = self.harness.allowlist();

        ranked
            .into_iter()
            .find(|rec| allowlist.contains(&rec.model.id) && self.credentials.contains(&rec.model.provider))
            .map(|rec| {
                tracing::debug!(
                    model = %rec.model.id,
                    task = %criteria.task,
                    score = rec.score,
                    confidence = %rec.confidence,
                    "model selected automatically"
                );
                rec.model
            })
            .ok_or_else(|| {
                LlmError::Routing(RoutingError::SelectionImpossible {
                    reason: "no allowlisted model with credentials fits the request".to_owned(),
                })
            })
    }

    /// Dispatch the same request to several models concurrently
    ///
    /// One failure never fails the batch; every model gets an outcome.
    pub async fn compare(&self, request: &DispatchRequest, models: &[String]) -> ComparisonReport {
        self.compare_with_cancel(request, models, &CancellationToken::new()).await
    }

    pub async fn compare_with_cancel(
        &self,
        request: &DispatchRequest,
        models: &[String],
        cancel: &CancellationToken,
    ) -> ComparisonReport {
        let runs = models.iter().map(|model| async move {
            let request = request.clone().with_model(model.clone());
            ComparisonOutcome {
                model: model.clone(),
                result: self.dispatch_with_cancel(&request, cancel).await,
            }
        });

        let report = ComparisonReport::new(join_all(runs).await);
        tracing::info!(
            models = models.len(),
            succeeded = report.succeeded,
            failed = report.failed,
            "comparison completed"
        );
        report
    }
}

/// Provider attempts behind a failed dispatch
///
/// Failures raised before the harness made a call count as zero.
const fn attempts_of(error: &LlmError) -> u32 {
    match error {
        LlmError::RetriesExhausted { attempts, .. } => *attempts,
        LlmError::Timeout { .. }
        | LlmError::RateLimited { .. }
        | LlmError::Network(_)
        | LlmError::Upstream { .. }
        | LlmError::Authentication { .. }
        | LlmError::Rejected { .. }
        | LlmError::Internal(_) => 1,
        _ => 0,
    }
}
