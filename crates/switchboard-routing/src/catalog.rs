//! Model catalog with cost, limit, and capability metadata
//!
//! A [`ModelCatalog`] is an immutable snapshot. [`CatalogHandle`] holds the
//! current snapshot for the process and swaps whole tables on refresh, so a
//! reader always sees either the old catalog or the new one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use switchboard_config::{CapabilitiesConfig, CatalogConfig, Lifecycle, ModelDescriptorConfig, Tier};

use crate::error::RoutingError;
use crate::provider::Provider;

/// Optional features a model supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Accepts image input
    pub vision: bool,
    /// Supports structured JSON output
    pub json_mode: bool,
    /// Supports streamed responses
    pub streaming: bool,
}

impl From<CapabilitiesConfig> for Capabilities {
    fn from(config: CapabilitiesConfig) -> Self {
        Self {
            vision: config.vision,
            json_mode: config.json_mode,
            streaming: config.streaming,
        }
    }
}

/// One addressable model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescriptor {
    /// Model identifier sent to the provider
    pub id: String,
    /// Vendor serving the model
    pub provider: Provider,
    /// Human-readable name
    pub display_name: String,
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
    pub capabilities: Capabilities,
    /// Catalog "recommended" flag
    pub recommended: bool,
    /// Lifecycle status
    pub lifecycle: Lifecycle,
}

impl ModelDescriptor {
    /// Whether the model may still be selected or dispatched
    pub fn is_available(&self) -> bool {
        self.lifecycle != Lifecycle::Sunset
    }
}

impl From<&ModelDescriptorConfig> for ModelDescriptor {
    fn from(config: &ModelDescriptorConfig) -> Self {
        Self {
            id: config.id.clone(),
            provider: Provider::from(config.provider.as_str()),
            display_name: config.display_name.clone().unwrap_or_else(|| config.id.clone()),
            tier: config.tier,
            context_window: config.context_window,
            max_output_tokens: config.max_output_tokens,
            input_per_mtok: config.input_per_mtok,
            output_per_mtok: config.output_per_mtok,
            capabilities: config.capabilities.into(),
            recommended: config.recommended,
            lifecycle: config.lifecycle,
        }
    }
}

/// Immutable registry of known models, in insertion order
#[derive(Debug, Default)]
pub struct ModelCatalog {
    models: Vec<Arc<ModelDescriptor>>,
    index: HashMap<String, usize>,
}

impl ModelCatalog {
    /// Build a catalog, rejecting duplicate identifiers
    pub fn new(models: impl IntoIterator<Item = ModelDescriptor>) -> Result<Self, RoutingError> {
        let mut catalog = Self::default();

        for model in models {
            if catalog.index.contains_key(&model.id) {
                return Err(RoutingError::DuplicateModel { model: model.id });
            }
            catalog.index.insert(model.id.clone(), catalog.models.len());
            catalog.models.push(Arc::new(model));
        }

        Ok(catalog)
    }

    /// Build a catalog from configuration, seeding built-ins when enabled
    pub fn from_config(config: &CatalogConfig) -> Result<Self, RoutingError> {
        let builtins = if config.builtin {
            crate::builtin::models()
        } else {
            Vec::new()
        };

        let catalog = Self::new(builtins.into_iter().chain(config.models.iter().map(ModelDescriptor::from)))?;

        tracing::debug!(models = catalog.len(), builtin = config.builtin, "model catalog loaded");

        Ok(catalog)
    }

    /// All models in insertion order
    pub fn list(&self) -> &[Arc<ModelDescriptor>] {
        &self.models
    }

    /// Look up a model by identifier
    pub fn get(&self, id: &str) -> Result<&Arc<ModelDescriptor>, RoutingError> {
        self.index
            .get(id)
            .map(|&i| &self.models[i])
            .ok_or_else(|| RoutingError::ModelNotFound { model: id.to_owned() })
    }

    /// Position of a model in insertion order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Models served by one provider
    pub fn find_by_provider<'a>(&'a self, provider: &'a Provider) -> impl Iterator<Item = &'a Arc<ModelDescriptor>> {
        self.models.iter().filter(move |m| &m.provider == provider)
    }

    /// Models carrying the "recommended" flag
    pub fn recommended(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>> {
        self.models.iter().filter(|m| m.recommended)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Process-wide pointer to the current catalog snapshot
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<ModelCatalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// The current snapshot; stays valid and unchanged after later swaps
    pub fn snapshot(&self) -> Arc<ModelCatalog> {
        Arc::clone(&self.current.read())
    }

    /// Install a new catalog, returning the one it replaced
    pub fn replace(&self, catalog: ModelCatalog) -> Arc<ModelCatalog> {
        let next = Arc::new(catalog);
        let previous = std::mem::replace(&mut *self.current.write(), next);

        tracing::info!(
            previous_models = previous.len(),
            models = self.current.read().len(),
            "model catalog replaced"
        );

        previous
    }

    /// Rebuild from configuration and swap it in
    ///
    /// The new table is fully built before the swap; on error the current
    /// catalog stays in place.
    pub fn reload(&self, config: &CatalogConfig) -> Result<(), RoutingError> {
        let catalog = ModelCatalog::from_config(config)?;
        self.replace(catalog);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn descriptor(id: &str, provider: Provider, tier: Tier, context_window: u32) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_owned(),
            provider,
            display_name: id.to_owned(),
            tier,
            context_window,
            max_output_tokens: 4096,
            input_per_mtok: 1.0,
            output_per_mtok: 2.0,
            capabilities: Capabilities::default(),
            recommended: false,
            lifecycle: Lifecycle::Active,
        }
    }

    #[test]
    fn lookup_by_id() {
        let catalog = ModelCatalog::new([
            descriptor("a", Provider::OpenAi, Tier::Free, 8_000),
            descriptor("b", Provider::Anthropic, Tier::Premium, 200_000),
        ])
        .unwrap();

        assert_eq!(catalog.get("b").unwrap().provider, Provider::Anthropic);
        assert_eq!(catalog.position("b"), Some(1));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn unknown_id_is_typed_error() {
        let catalog = ModelCatalog::new([descriptor("a", Provider::OpenAi, Tier::Free, 8_000)]).unwrap();
        let err = catalog.get("missing").unwrap_err();
        assert!(matches!(err, RoutingError::ModelNotFound { model } if model == "missing"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = ModelCatalog::new([
            descriptor("a", Provider::OpenAi, Tier::Free, 8_000),
            descriptor("a", Provider::Groq, Tier::Free, 8_000),
        ])
        .unwrap_err();
        assert!(matches!(err, RoutingError::DuplicateModel { model } if model == "a"));
    }

    #[test]
    fn loading_is_idempotent() {
        let config = CatalogConfig::default();
        let first = ModelCatalog::from_config(&config).unwrap();
        let second = ModelCatalog::from_config(&config).unwrap();

        let ids = |c: &ModelCatalog| c.list().iter().map(|m| m.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert!(!first.is_empty());
    }

    #[test]
    fn config_model_colliding_with_builtin_rejected() {
        let config = CatalogConfig {
            builtin: true,
            models: vec![ModelDescriptorConfig {
                id: "gpt-4o-mini".to_owned(),
                provider: "openai".to_owned(),
                display_name: None,
                tier: Tier::Affordable,
                context_window: 1_000,
                max_output_tokens: 100,
                input_per_mtok: 0.1,
                output_per_mtok: 0.1,
                capabilities: CapabilitiesConfig::default(),
                recommended: false,
                lifecycle: Lifecycle::Active,
            }],
        };

        assert!(matches!(
            ModelCatalog::from_config(&config),
            Err(RoutingError::DuplicateModel { .. })
        ));
    }

    #[test]
    fn provider_and_recommended_filters() {
        let mut recommended = descriptor("r", Provider::Google, Tier::Affordable, 1_000_000);
        recommended.recommended = true;
        let catalog = ModelCatalog::new([
            descriptor("a", Provider::OpenAi, Tier::Free, 8_000),
            recommended,
            descriptor("c", Provider::OpenAi, Tier::Premium, 128_000),
        ])
        .unwrap();

        let openai = Provider::OpenAi;
        let ids: Vec<_> = catalog.find_by_provider(&openai).map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(catalog.recommended().count(), 1);
    }

    #[test]
    fn replace_swaps_whole_table() {
        let handle = CatalogHandle::new(ModelCatalog::new([descriptor("old", Provider::OpenAi, Tier::Free, 8_000)]).unwrap());
        let before = handle.snapshot();

        let previous = handle.replace(
            ModelCatalog::new([
                descriptor("new-a", Provider::OpenAi, Tier::Free, 8_000),
                descriptor("new-b", Provider::Groq, Tier::Free, 8_000),
            ])
            .unwrap(),
        );

        // Old readers keep their consistent view
        assert_eq!(before.len(), 1);
        assert!(before.get("old").is_ok());
        assert!(Arc::ptr_eq(&before, &previous));

        let after = handle.snapshot();
        assert_eq!(after.len(), 2);
        assert!(after.get("old").is_err());
    }

    #[test]
    fn failed_reload_keeps_current_catalog() {
        let handle = CatalogHandle::new(ModelCatalog::new([descriptor("keep", Provider::OpenAi, Tier::Free, 8_000)]).unwrap());
        let entry = ModelDescriptorConfig {
            id: "dup".to_owned(),
            provider: "openai".to_owned(),
            display_name: None,
            tier: Tier::Free,
            context_window: 1_000,
            max_output_tokens: 100,
            input_per_mtok: 0.0,
            output_per_mtok: 0.0,
            capabilities: CapabilitiesConfig::default(),
            recommended: false,
            lifecycle: Lifecycle::Active,
        };
        let config = CatalogConfig {
            builtin: false,
            models: vec![entry.clone(), entry],
        };

        assert!(handle.reload(&config).is_err());
        assert!(handle.snapshot().get("keep").is_ok());
    }

    #[test]
    fn concurrent_readers_never_see_partial_tables() {
        let handle = CatalogHandle::new(ModelCatalog::new([descriptor("m0", Provider::OpenAi, Tier::Free, 8_000)]).unwrap());

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let reader = handle.clone();
                scope.spawn(move || {
                    for _ in 0..500 {
                        let snapshot = reader.snapshot();
                        // Every table installed below has ids m0..m{len-1}
                        for (i, model) in snapshot.list().iter().enumerate() {
                            assert_eq!(model.id, format!("m{i}"));
                        }
                    }
                });
            }

            for size in 1..50 {
                let models = (0..size).map(|i| descriptor(&format!("m{i}"), Provider::OpenAi, Tier::Free, 8_000));
                handle.replace(ModelCatalog::new(models).unwrap());
            }
        });
    }
}
