//! Scoring-based model selection
//!
//! Every catalog entry is scored against the request's [`SelectionCriteria`]
//! as a sum of bounded terms, recorded per term in a [`ScoreBreakdown`].
//! The unfloored sum is kept so that a model whose context window cannot
//! hold the request always ends up negative; the floor at zero is applied
//! once, to the final value.
//!
//! Scoring is pure: identical criteria against the same catalog snapshot
//! produce identical rankings.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use switchboard_config::{SelectionConfig, SelectionWeights, Tier};

use crate::affinity::AffinityTable;
use crate::catalog::{ModelCatalog, ModelDescriptor};
use crate::classify::{TaskCategory, classify_prompt};
use crate::error::RoutingError;
use crate::estimate::{Cost, estimate_cost, estimate_latency, estimate_tokens};
use crate::provider::{Provider, SpeedClass};

/// Default output budget when the caller does not give one
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Capabilities the request needs from a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredCapabilities {
    pub vision: bool,
    pub json: bool,
}

/// Independent caller priorities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Priorities {
    pub cost: bool,
    pub speed: bool,
    pub quality: bool,
}

/// Input to model selection
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    /// Kind of work requested
    pub task: TaskCategory,
    /// Prompt length in characters
    pub prompt_chars: usize,
    /// Desired maximum output tokens
    pub max_output_tokens: u32,
    /// Capabilities the model must offer to earn feature points
    pub required: RequiredCapabilities,
    /// Caller's subscription tier
    pub subscription_tier: Tier,
    /// Providers for which credentials are configured
    pub credentials: HashSet<Provider>,
    /// Cost, speed, and quality preferences
    pub priorities: Priorities,
    /// Model the caller explicitly prefers
    pub preferred_model: Option<String>,
}

impl SelectionCriteria {
    /// Criteria for a prompt with its task inferred from the text
    pub fn for_prompt(prompt: &str) -> Self {
        Self {
            task: classify_prompt(prompt),
            prompt_chars: prompt.chars().count(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            required: RequiredCapabilities::default(),
            subscription_tier: Tier::default(),
            credentials: HashSet::new(),
            priorities: Priorities::default(),
            preferred_model: None,
        }
    }

    /// Estimated tokens the call occupies in the context window
    pub fn required_tokens(&self) -> u64 {
        estimate_tokens(self.prompt_chars) + u64::from(self.max_output_tokens)
    }
}

/// Per-term contributions to a model's score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Task preference rank bonus
    pub affinity: f64,
    /// Headroom bonus, or the overflow penalty
    pub context_fit: f64,
    pub cost: f64,
    pub speed: f64,
    pub quality: f64,
    /// Required capabilities satisfied plus streaming
    pub features: f64,
    pub recommended: f64,
    /// Subscription tier compatibility
    pub tier: f64,
    /// Credential availability bonus or penalty
    pub credentials: f64,
    /// Explicit user preference
    pub preference: f64,
    /// Share of the context window the call would use
    pub utilization: f64,
    /// The call does not fit in the context window
    pub overflow: bool,
}

impl ScoreBreakdown {
    /// Unfloored sum of every term
    pub fn raw_total(&self) -> f64 {
        self.affinity
            + self.context_fit
            + self.cost
            + self.speed
            + self.quality
            + self.features
            + self.recommended
            + self.tier
            + self.credentials
            + self.preference
    }

    /// Final score, floored at zero
    pub fn score(&self) -> f64 {
        self.raw_total().max(0.0)
    }
}

/// Coarse strength of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// One scored model
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub model: Arc<ModelDescriptor>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
    pub estimated_cost: Cost,
    #[serde(rename = "estimated_latency_ms", serialize_with = "serialize_millis")]
    pub estimated_latency: Duration,
    pub confidence: Confidence,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}

/// Ranks catalog models against selection criteria
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    weights: SelectionWeights,
    affinity: AffinityTable,
    max_reasons: usize,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self {
            weights: SelectionWeights::default(),
            affinity: AffinityTable::default(),
            max_reasons: SelectionConfig::default().max_reasons,
        }
    }
}

impl SelectionEngine {
    /// Build an engine from selection configuration
    pub fn new(config: &SelectionConfig) -> Result<Self, RoutingError> {
        Ok(Self {
            weights: config.weights.clone(),
            affinity: AffinityTable::from_config(config)?,
            max_reasons: config.max_reasons,
        })
    }

    pub const fn affinity(&self) -> &AffinityTable {
        &self.affinity
    }

    /// Score one model term by term
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, model: &ModelDescriptor, criteria: &SelectionCriteria) -> ScoreBreakdown {
        let w = &self.weights;
        let required = criteria.required_tokens();
        let window = u64::from(model.context_window);

        let credentials = if criteria.credentials.contains(&model.provider) {
            w.credentials_present
        } else {
            w.credentials_missing_penalty
        };

        if window == 0 || required > window {
            // Overflow is a hard signal: no positive term may offset it
            return ScoreBreakdown {
                context_fit: w.context_overflow_penalty,
                credentials: credentials.min(0.0),
                utilization: if window == 0 { f64::INFINITY } else { required as f64 / window as f64 },
                overflow: true,
                ..ScoreBreakdown::default()
            };
        }

        let utilization = required as f64 / window as f64;

        let affinity = self
            .affinity
            .rank(criteria.task, &model.id)
            .map_or(0.0, |rank| (w.affinity_step.mul_add(-(rank as f64), w.affinity_top)).max(0.0));

        let cost = if criteria.priorities.cost || criteria.subscription_tier == Tier::Free {
            w.cost_per_usd.mul_add(-model.input_per_mtok, w.cost_max).max(0.0)
        } else {
            0.0
        };

        let speed = if criteria.priorities.speed {
            match model.provider.speed_class() {
                SpeedClass::Fast => w.speed_fast,
                SpeedClass::Quick => w.speed_quick,
                SpeedClass::Standard => w.speed_standard,
                SpeedClass::Unrated => 0.0,
            }
        } else {
            0.0
        };

        let quality = if criteria.priorities.quality {
            match model.tier {
                Tier::Premium => w.quality_premium,
                Tier::Affordable => w.quality_affordable,
                Tier::Free => 0.0,
            }
        } else {
            0.0
        };

        let mut features = 0.0;
        if criteria.required.vision && model.capabilities.vision {
            features += w.feature_match;
        }
        if criteria.required.json && model.capabilities.json_mode {
            features += w.feature_match;
        }
        if model.capabilities.streaming {
            features += w.streaming;
        }

        let tier = if model.tier == criteria.subscription_tier {
            w.tier_exact
        } else if criteria.subscription_tier.downgrade() == Some(model.tier) {
            w.tier_downgrade
        } else {
            0.0
        };

        let preference = if criteria.preferred_model.as_deref() == Some(model.id.as_str()) {
            w.user_preference
        } else {
            0.0
        };

        ScoreBreakdown {
            affinity,
            context_fit: w.context_headroom * (1.0 - utilization),
            cost,
            speed,
            quality,
            features,
            recommended: if model.recommended { w.recommended } else { 0.0 },
            tier,
            credentials,
            preference,
            utilization,
            overflow: false,
        }
    }

    /// Score one model and attach reasons, estimates, and confidence
    pub fn evaluate(&self, model: &Arc<ModelDescriptor>, criteria: &SelectionCriteria) -> Recommendation {
        let breakdown = self.score(model, criteria);
        let input_tokens = estimate_tokens(criteria.prompt_chars);
        let output_tokens = u64::from(criteria.max_output_tokens.min(model.max_output_tokens));

        Recommendation {
            model: Arc::clone(model),
            score: breakdown.score(),
            reasons: self.reasons(model, criteria, &breakdown),
            estimated_cost: estimate_cost(model, input_tokens, output_tokens),
            estimated_latency: estimate_latency(model, input_tokens, output_tokens),
            confidence: self.confidence(model, criteria, &breakdown),
            breakdown,
        }
    }

    /// The `n` best models, highest score first
    ///
    /// Sunset and overflowing models are never returned. Equal scores keep
    /// catalog order.
    pub fn select_top(
        &self,
        catalog: &ModelCatalog,
        criteria: &SelectionCriteria,
        n: usize,
    ) -> Result<Vec<Recommendation>, RoutingError> {
        if catalog.is_empty() {
            return Err(RoutingError::EmptyCatalog);
        }

        let mut ranked: Vec<Recommendation> = catalog
            .list()
            .iter()
            .filter(|model| model.is_available())
            .map(|model| self.evaluate(model, criteria))
            .filter(|rec| !rec.breakdown.overflow)
            .collect();

        if ranked.is_empty() {
            return Err(RoutingError::SelectionImpossible {
                reason: format!(
                    "no available model has a context window for ~{} tokens",
                    criteria.required_tokens()
                ),
            });
        }

        if !ranked.iter().any(|rec| criteria.credentials.contains(&rec.model.provider)) {
            return Err(RoutingError::SelectionImpossible {
                reason: "no credentials configured for any provider that can serve the request".to_owned(),
            });
        }

        // Stable: ties keep catalog insertion order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(n);

        if let Some(best) = ranked.first() {
            tracing::debug!(
                task = %criteria.task,
                model = %best.model.id,
                score = best.score,
                confidence = %best.confidence,
                candidates = ranked.len(),
                "model selected"
            );
        }

        Ok(ranked)
    }

    /// The single best model
    pub fn select_best(
        &self,
        catalog: &ModelCatalog,
        criteria: &SelectionCriteria,
    ) -> Result<Recommendation, RoutingError> {
        self.select_top(catalog, criteria, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::SelectionImpossible {
                reason: "no candidate models".to_owned(),
            })
    }

    fn confidence(&self, model: &ModelDescriptor, criteria: &SelectionCriteria, breakdown: &ScoreBreakdown) -> Confidence {
        if breakdown.overflow {
            return Confidence::Low;
        }

        let mut points = match self.affinity.rank(criteria.task, &model.id) {
            Some(0) => 3,
            Some(1 | 2) => 2,
            Some(_) => 1,
            None => 0,
        };

        if breakdown.utilization <= 0.5 {
            points += 2;
        } else if breakdown.utilization <= 0.8 {
            points += 1;
        }

        if criteria.credentials.contains(&model.provider) {
            points += 2;
        }
        if model.recommended {
            points += 1;
        }

        match points {
            6.. => Confidence::High,
            3..=5 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    /// Human-readable justifications, warnings first, then by contribution
    fn reasons(&self, model: &ModelDescriptor, criteria: &SelectionCriteria, breakdown: &ScoreBreakdown) -> Vec<String> {
        let mut warnings = Vec::new();

        if breakdown.overflow {
            warnings.push(format!(
                "needs ~{} tokens but the context window is {}",
                criteria.required_tokens(),
                model.context_window
            ));
        }
        if breakdown.credentials < 0.0 {
            warnings.push(format!("no credentials configured for {}", model.provider));
        }
        if model.lifecycle == switchboard_config::Lifecycle::Deprecated {
            warnings.push("model is deprecated".to_owned());
        }

        let mut signals: Vec<(f64, String)> = Vec::new();

        if breakdown.preference > 0.0 {
            signals.push((breakdown.preference, "matches your preferred model".to_owned()));
        }
        if breakdown.affinity > 0.0
            && let Some(rank) = self.affinity.rank(criteria.task, &model.id)
        {
            signals.push((breakdown.affinity, format!("ranked #{} for {} tasks", rank + 1, criteria.task)));
        }
        if breakdown.context_fit > 0.0 {
            signals.push((
                breakdown.context_fit,
                format!("fits the context window with {:.0}% headroom", (1.0 - breakdown.utilization) * 100.0),
            ));
        }
        if breakdown.credentials > 0.0 {
            signals.push((breakdown.credentials, format!("credentials available for {}", model.provider)));
        }
        if breakdown.cost > 0.0 {
            signals.push((breakdown.cost, format!("low input cost (${}/M tokens)", model.input_per_mtok)));
        }
        if breakdown.speed > 0.0 {
            signals.push((breakdown.speed, format!("{} serves responses quickly", model.provider)));
        }
        if breakdown.quality > 0.0 {
            signals.push((breakdown.quality, format!("{} tier quality", model.tier)));
        }
        if breakdown.tier > 0.0 {
            signals.push((breakdown.tier, format!("{} tier fits your subscription", model.tier)));
        }
        if breakdown.features > 0.0 {
            signals.push((breakdown.features, "supports the requested features".to_owned()));
        }
        if breakdown.recommended > 0.0 {
            signals.push((breakdown.recommended, "recommended in the catalog".to_owned()));
        }

        signals.sort_by(|a, b| b.0.total_cmp(&a.0));

        warnings
            .into_iter()
            .chain(signals.into_iter().map(|(_, reason)| reason))
            .take(self.max_reasons)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use switchboard_config::{CatalogConfig, Lifecycle};

    use super::*;
    use crate::catalog::tests::descriptor;

    const EPS: f64 = 1e-9;

    fn all_credentials() -> HashSet<Provider> {
        [
            Provider::OpenAi,
            Provider::Anthropic,
            Provider::Google,
            Provider::Groq,
            Provider::Mistral,
            Provider::DeepSeek,
        ]
        .into_iter()
        .collect()
    }

    fn criteria(prompt_chars: usize, max_output_tokens: u32) -> SelectionCriteria {
        SelectionCriteria {
            task: TaskCategory::Code,
            prompt_chars,
            max_output_tokens,
            required: RequiredCapabilities::default(),
            subscription_tier: Tier::Affordable,
            credentials: [Provider::OpenAi].into_iter().collect(),
            priorities: Priorities::default(),
            preferred_model: None,
        }
    }

    fn builtin() -> ModelCatalog {
        ModelCatalog::from_config(&CatalogConfig::default()).unwrap()
    }

    #[test]
    fn baseline_terms() {
        let engine = SelectionEngine::default();
        let model = descriptor("plain", Provider::OpenAi, Tier::Affordable, 100_000);

        // 4000 chars -> 1000 tokens, plus 1000 output: 2% of the window
        let breakdown = engine.score(&model, &criteria(4_000, 1_000));

        assert!((breakdown.utilization - 0.02).abs() < EPS);
        assert!((breakdown.context_fit - 19.6).abs() < EPS);
        assert!((breakdown.tier - 10.0).abs() < EPS);
        assert!((breakdown.credentials - 20.0).abs() < EPS);
        assert!(breakdown.affinity.abs() < EPS);
        assert!(breakdown.cost.abs() < EPS);
        assert!(breakdown.features.abs() < EPS);
        assert!((breakdown.raw_total() - 49.6).abs() < EPS);
    }

    #[test]
    fn priority_terms() {
        let engine = SelectionEngine::default();
        let mut model = descriptor("m", Provider::OpenAi, Tier::Affordable, 100_000);
        model.input_per_mtok = 1.0;
        model.capabilities.vision = true;
        model.capabilities.streaming = true;
        model.recommended = true;

        let mut c = criteria(4_000, 1_000);
        c.priorities = Priorities {
            cost: true,
            speed: true,
            quality: true,
        };
        c.required = RequiredCapabilities { vision: true, json: true };
        c.preferred_model = Some("m".to_owned());

        let b = engine.score(&model, &c);
        assert!((b.cost - 12.0).abs() < EPS);
        assert!((b.speed - 5.0).abs() < EPS);
        assert!((b.quality - 5.0).abs() < EPS);
        // vision matched, json not supported, streaming bonus
        assert!((b.features - 8.0).abs() < EPS);
        assert!((b.recommended - 5.0).abs() < EPS);
        assert!((b.preference - 30.0).abs() < EPS);
    }

    #[test]
    fn free_tier_always_scores_cost() {
        let engine = SelectionEngine::default();
        let mut model = descriptor("m", Provider::Groq, Tier::Free, 100_000);
        model.input_per_mtok = 0.5;

        let mut c = criteria(400, 100);
        c.subscription_tier = Tier::Free;

        let b = engine.score(&model, &c);
        assert!((b.cost - 13.5).abs() < EPS);
        assert!((b.tier - 10.0).abs() < EPS);
    }

    #[test]
    fn expensive_model_cost_term_floors_at_zero() {
        let engine = SelectionEngine::default();
        let mut model = descriptor("m", Provider::OpenAi, Tier::Premium, 100_000);
        model.input_per_mtok = 15.0;

        let mut c = criteria(400, 100);
        c.priorities.cost = true;
        assert!(engine.score(&model, &c).cost.abs() < EPS);
    }

    #[test]
    fn affinity_decays_by_rank() {
        let engine = SelectionEngine::default();
        let c = criteria(400, 100);

        let top = descriptor("claude-3-5-sonnet-20241022", Provider::Anthropic, Tier::Premium, 200_000);
        let second = descriptor("gpt-4o", Provider::OpenAi, Tier::Premium, 128_000);
        let fifth = descriptor("llama-3.3-70b-versatile", Provider::Groq, Tier::Affordable, 131_072);

        assert!((engine.score(&top, &c).affinity - 40.0).abs() < EPS);
        assert!((engine.score(&second, &c).affinity - 30.0).abs() < EPS);
        assert!(engine.score(&fifth, &c).affinity.abs() < EPS);
    }

    #[test]
    fn tier_downgrade_earns_partial_credit() {
        let engine = SelectionEngine::default();
        let mut c = criteria(400, 100);
        c.subscription_tier = Tier::Premium;

        let affordable = descriptor("a", Provider::OpenAi, Tier::Affordable, 100_000);
        let free = descriptor("f", Provider::OpenAi, Tier::Free, 100_000);

        assert!((engine.score(&affordable, &c).tier - 5.0).abs() < EPS);
        assert!(engine.score(&free, &c).tier.abs() < EPS);
    }

    #[test]
    fn overflow_is_always_negative() {
        let engine = SelectionEngine::default();
        let mut model = descriptor("tiny", Provider::OpenAi, Tier::Affordable, 1_000);
        model.recommended = true;
        model.capabilities.streaming = true;

        let mut c = criteria(4_000, 1_000);
        c.preferred_model = Some("tiny".to_owned());
        c.priorities = Priorities {
            cost: true,
            speed: true,
            quality: true,
        };

        let b = engine.score(&model, &c);
        assert!(b.overflow);
        assert!((b.context_fit + 50.0).abs() < EPS);
        assert!(b.preference.abs() < EPS);
        assert!(b.credentials.abs() < EPS);
        assert!(b.raw_total() < 0.0);
        assert!(b.score().abs() < EPS);

        c.credentials.clear();
        let b = engine.score(&model, &c);
        assert!((b.raw_total() + 80.0).abs() < EPS);
    }

    #[test]
    fn overflow_negative_across_prompt_sizes() {
        let engine = SelectionEngine::default();
        let catalog = builtin();

        for prompt_chars in [0, 1, 10_000, 40_000, 400_000, 4_000_000, 9_000_000] {
            for max_output_tokens in [1, 2_000, 16_384] {
                let mut c = criteria(prompt_chars, max_output_tokens);
                c.credentials = all_credentials();
                c.preferred_model = Some("gemma2-9b-it".to_owned());
                c.priorities = Priorities {
                    cost: true,
                    speed: true,
                    quality: true,
                };

                for model in catalog.list() {
                    let b = engine.score(model, &c);
                    if c.required_tokens() > u64::from(model.context_window) {
                        assert!(b.raw_total() < 0.0, "{} scored {}", model.id, b.raw_total());
                    }
                }
            }
        }
    }

    #[test]
    fn score_floors_only_at_the_end() {
        let engine = SelectionEngine::default();
        let model = descriptor("m", Provider::Anthropic, Tier::Premium, 100_000);
        let c = criteria(4_000, 1_000);

        // headroom 19.6, tier 0, missing credentials -30
        let b = engine.score(&model, &c);
        assert!((b.raw_total() + 10.4).abs() < EPS);
        assert!(b.score().abs() < EPS);
    }

    #[test]
    fn select_best_is_deterministic() {
        let engine = SelectionEngine::default();
        let catalog = builtin();
        let mut c = criteria(12_000, 2_000);
        c.credentials = all_credentials();

        let first = engine.select_best(&catalog, &c).unwrap();
        for _ in 0..20 {
            let again = engine.select_best(&catalog, &c).unwrap();
            assert_eq!(again.model.id, first.model.id);
            assert!((again.score - first.score).abs() < f64::EPSILON);
            assert_eq!(again.reasons, first.reasons);
        }
    }

    #[test]
    fn large_prompt_never_ranks_small_window_model() {
        let engine = SelectionEngine::default();
        let catalog = builtin();
        assert_eq!(catalog.get("gemma2-9b-it").unwrap().context_window, 8_192);

        for task in TaskCategory::ALL {
            let mut c = criteria(40_000, DEFAULT_MAX_OUTPUT_TOKENS);
            c.task = task;
            c.credentials = all_credentials();
            c.subscription_tier = Tier::Free;
            c.preferred_model = Some("gemma2-9b-it".to_owned());

            let top = engine.select_top(&catalog, &c, 3).unwrap();
            assert_eq!(top.len(), 3);
            assert!(top.iter().all(|rec| rec.model.id != "gemma2-9b-it"));
        }
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let engine = SelectionEngine::default();
        let catalog = ModelCatalog::new([
            descriptor("first", Provider::OpenAi, Tier::Affordable, 100_000),
            descriptor("second", Provider::OpenAi, Tier::Affordable, 100_000),
            descriptor("better", Provider::OpenAi, Tier::Affordable, 1_000_000),
        ])
        .unwrap();

        let ranked = engine.select_top(&catalog, &criteria(4_000, 1_000), 10).unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.model.id.as_str()).collect();
        assert_eq!(ids, vec!["better", "first", "second"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn select_top_respects_n() {
        let engine = SelectionEngine::default();
        let mut c = criteria(400, 100);
        c.credentials = all_credentials();

        assert_eq!(engine.select_top(&builtin(), &c, 2).unwrap().len(), 2);
        assert!(engine.select_top(&builtin(), &c, 0).unwrap().is_empty());
    }

    #[test]
    fn everything_overflowing_is_selection_impossible() {
        let engine = SelectionEngine::default();
        let catalog = ModelCatalog::new([descriptor("small", Provider::OpenAi, Tier::Free, 1_000)]).unwrap();

        let err = engine.select_best(&catalog, &criteria(40_000, 2_000)).unwrap_err();
        assert!(matches!(err, RoutingError::SelectionImpossible { .. }));
    }

    #[test]
    fn no_credentials_is_selection_impossible() {
        let engine = SelectionEngine::default();
        let mut c = criteria(400, 100);
        c.credentials.clear();

        let err = engine.select_best(&builtin(), &c).unwrap_err();
        assert!(matches!(err, RoutingError::SelectionImpossible { .. }));
    }

    #[test]
    fn missing_credentials_rank_below_but_remain_listed() {
        let engine = SelectionEngine::default();
        let catalog = ModelCatalog::new([
            descriptor("keyless", Provider::Anthropic, Tier::Affordable, 100_000),
            descriptor("keyed", Provider::OpenAi, Tier::Affordable, 100_000),
        ])
        .unwrap();

        let ranked = engine.select_top(&catalog, &criteria(400, 100), 5).unwrap();
        assert_eq!(ranked[0].model.id, "keyed");
        assert_eq!(ranked[1].model.id, "keyless");
        assert!(ranked[1].reasons[0].contains("no credentials"));
    }

    #[test]
    fn sunset_models_never_selected() {
        let engine = SelectionEngine::default();
        let mut gone = descriptor("gone", Provider::OpenAi, Tier::Affordable, 1_000_000);
        gone.lifecycle = Lifecycle::Sunset;
        let mut c = criteria(400, 100);
        c.preferred_model = Some("gone".to_owned());

        let catalog = ModelCatalog::new([gone, descriptor("live", Provider::OpenAi, Tier::Free, 8_000)]).unwrap();
        let ranked = engine.select_top(&catalog, &c, 5).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].model.id, "live");
    }

    #[test]
    fn deprecated_models_are_flagged() {
        let engine = SelectionEngine::default();
        let mut old = descriptor("old", Provider::OpenAi, Tier::Affordable, 100_000);
        old.lifecycle = Lifecycle::Deprecated;

        let rec = engine.evaluate(&Arc::new(old), &criteria(400, 100));
        assert_eq!(rec.reasons[0], "model is deprecated");
    }

    #[test]
    fn reasons_are_capped() {
        let engine = SelectionEngine::default();
        let catalog = builtin();
        let mut c = criteria(400, 100);
        c.credentials = all_credentials();
        c.priorities = Priorities {
            cost: true,
            speed: true,
            quality: true,
        };

        for rec in engine.select_top(&catalog, &c, 5).unwrap() {
            assert!(!rec.reasons.is_empty());
            assert!(rec.reasons.len() <= 4);
        }
    }

    #[test]
    fn confidence_buckets() {
        let engine = SelectionEngine::default();
        let catalog = builtin();
        let mut c = criteria(400, 100);
        c.credentials = all_credentials();

        // Top code pick, ample headroom, keyed, recommended
        let sonnet = catalog.get("claude-3-5-sonnet-20241022").unwrap();
        assert_eq!(engine.evaluate(sonnet, &c).confidence, Confidence::High);

        // Unranked but keyed with headroom
        let haiku = catalog.get("claude-3-5-haiku-20241022").unwrap();
        assert_eq!(engine.evaluate(haiku, &c).confidence, Confidence::Medium);

        c.credentials.clear();
        let small = descriptor("small", Provider::OpenAi, Tier::Free, 1_000);
        assert_eq!(engine.evaluate(&Arc::new(small), &c).confidence, Confidence::Low);
    }

    #[test]
    fn estimates_are_attached() {
        let engine = SelectionEngine::default();
        let catalog = builtin();
        let rec = engine.evaluate(catalog.get("gpt-4o").unwrap(), &criteria(4_000, 1_000));

        assert!((rec.estimated_cost.total - (rec.estimated_cost.input + rec.estimated_cost.output)).abs() < EPS);
        assert!(rec.estimated_cost.total > 0.0);
        assert!(rec.estimated_latency > Duration::ZERO);
    }

    #[test]
    fn criteria_from_prompt() {
        let c = SelectionCriteria::for_prompt("Translate this into Spanish");
        assert_eq!(c.task, TaskCategory::Translation);
        assert_eq!(c.prompt_chars, 27);
        assert_eq!(c.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
    }
}
