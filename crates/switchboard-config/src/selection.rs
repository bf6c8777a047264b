use std::collections::BTreeMap;

use serde::Deserialize;

use crate::catalog::Tier;

/// Model selection configuration
///
/// Every scoring constant lives here so deployments can retune the
/// engine without a rebuild. Defaults reproduce the stock policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Subscription tier assumed when a request does not carry one
    #[serde(default)]
    pub subscription_tier: Tier,
    /// Maximum number of reasons attached to a recommendation
    #[serde(default = "default_max_reasons")]
    pub max_reasons: usize,
    /// Scoring weights and penalties
    #[serde(default)]
    pub weights: SelectionWeights,
    /// Per-task ordered model preference lists, overriding the built-ins
    ///
    /// Keys are task category names such as `code` or `summarization`.
    #[serde(default)]
    pub affinity: BTreeMap<String, Vec<String>>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            subscription_tier: Tier::default(),
            max_reasons: default_max_reasons(),
            weights: SelectionWeights::default(),
            affinity: BTreeMap::new(),
        }
    }
}

/// Points awarded or deducted by each scoring criterion
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SelectionWeights {
    /// Points for the first model in a task's preference list
    pub affinity_top: f64,
    /// Points lost per rank step down the preference list
    pub affinity_step: f64,
    /// Maximum points for context headroom
    pub context_headroom: f64,
    /// Flat penalty when the prompt cannot fit the context window
    pub context_overflow_penalty: f64,
    /// Maximum points for low input cost
    pub cost_max: f64,
    /// Points lost per USD of input cost per million tokens
    pub cost_per_usd: f64,
    /// Speed bonus for the fastest provider class
    pub speed_fast: f64,
    /// Speed bonus for the second provider class
    pub speed_quick: f64,
    /// Speed bonus for the third provider class
    pub speed_standard: f64,
    /// Quality bonus for premium models
    pub quality_premium: f64,
    /// Quality bonus for affordable models
    pub quality_affordable: f64,
    /// Points per satisfied required capability
    pub feature_match: f64,
    /// Points for streaming support
    pub streaming: f64,
    /// Points for the catalog "recommended" flag
    pub recommended: f64,
    /// Points when model tier equals the subscription tier
    pub tier_exact: f64,
    /// Points when the model sits one tier below the subscription
    pub tier_downgrade: f64,
    /// Points when credentials exist for the provider
    pub credentials_present: f64,
    /// Penalty when no credentials exist for the provider
    pub credentials_missing_penalty: f64,
    /// Points when the model is the caller's stated preference
    pub user_preference: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            affinity_top: 40.0,
            affinity_step: 10.0,
            context_headroom: 20.0,
            context_overflow_penalty: -50.0,
            cost_max: 15.0,
            cost_per_usd: 3.0,
            speed_fast: 10.0,
            speed_quick: 7.0,
            speed_standard: 5.0,
            quality_premium: 10.0,
            quality_affordable: 5.0,
            feature_match: 5.0,
            streaming: 3.0,
            recommended: 5.0,
            tier_exact: 10.0,
            tier_downgrade: 5.0,
            credentials_present: 20.0,
            credentials_missing_penalty: -30.0,
            user_preference: 30.0,
        }
    }
}

const fn default_max_reasons() -> usize {
    4
}
