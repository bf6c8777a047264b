use serde::{Deserialize, Serialize};

/// Model catalog configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Seed the catalog with the built-in vetted models
    #[serde(default = "default_true")]
    pub builtin: bool,
    /// Additional model descriptors, appended after the built-ins
    #[serde(default)]
    pub models: Vec<ModelDescriptorConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            models: Vec::new(),
        }
    }
}

/// Pricing and capability tier of a model, also used for caller subscriptions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// No-cost models and subscriptions
    #[default]
    Free,
    /// Low-cost models
    Affordable,
    /// Frontier models
    Premium,
}

impl Tier {
    /// The tier directly below this one, if any
    pub const fn downgrade(self) -> Option<Self> {
        match self {
            Self::Free => None,
            Self::Affordable => Some(Self::Free),
            Self::Premium => Some(Self::Affordable),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Free => "free",
            Self::Affordable => "affordable",
            Self::Premium => "premium",
        })
    }
}

/// Lifecycle status of a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Fully supported
    #[default]
    Active,
    /// Still callable, scheduled for removal
    Deprecated,
    /// Removed by the vendor; never selected or dispatched
    Sunset,
}

/// Optional features a model supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitiesConfig {
    /// Accepts image input
    #[serde(default)]
    pub vision: bool,
    /// Supports a structured JSON output mode
    #[serde(default)]
    pub json_mode: bool,
    /// Supports streamed responses
    #[serde(default)]
    pub streaming: bool,
}

/// One model entry as written in configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDescriptorConfig {
    /// Model identifier sent to the provider
    pub id: String,
    /// Provider name (e.g. "openai", "anthropic")
    pub provider: String,
    /// Human-readable name, defaults to the identifier
    #[serde(default)]
    pub display_name: Option<String>,
    /// Pricing tier
    pub tier: Tier,
    /// Context window in tokens
    pub context_window: u32,
    /// Maximum output tokens per response
    pub max_output_tokens: u32,
    /// Cost per million input tokens (USD)
    pub input_per_mtok: f64,
    /// Cost per million output tokens (USD)
    pub output_per_mtok: f64,
    /// Supported features
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
    /// Catalog "recommended" flag
    #[serde(default)]
    pub recommended: bool,
    /// Lifecycle status
    #[serde(default)]
    pub lifecycle: Lifecycle,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ordering_and_downgrade() {
        assert!(Tier::Free < Tier::Affordable);
        assert!(Tier::Affordable < Tier::Premium);
        assert_eq!(Tier::Premium.downgrade(), Some(Tier::Affordable));
        assert_eq!(Tier::Free.downgrade(), None);
    }

    #[test]
    fn model_entry_defaults() {
        let entry: ModelDescriptorConfig = toml::from_str(
            r#"
            id = "local-llama"
            provider = "groq"
            tier = "free"
            context_window = 8192
            max_output_tokens = 2048
            input_per_mtok = 0.0
            output_per_mtok = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(entry.lifecycle, Lifecycle::Active);
        assert!(!entry.recommended);
        assert!(entry.display_name.is_none());
        assert_eq!(entry.capabilities, CapabilitiesConfig::default());
    }
}
