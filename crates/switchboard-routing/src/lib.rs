//! Model catalog and scoring-based model selection
//!
//! - [`ModelCatalog`] / [`CatalogHandle`]: immutable model tables with atomic replacement
//! - [`SelectionEngine`]: ranks models against [`SelectionCriteria`]
//! - [`estimate`]: token, cost, and latency estimates from catalog metadata

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod affinity;
mod builtin;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod estimate;
pub mod provider;
pub mod selection;

pub use affinity::AffinityTable;
pub use catalog::{Capabilities, CatalogHandle, ModelCatalog, ModelDescriptor};
pub use classify::{TaskCategory, classify_prompt};
pub use error::RoutingError;
pub use estimate::{Cost, estimate_cost, estimate_latency, estimate_tokens};
pub use provider::{Provider, ProviderFamily, SpeedClass};
pub use selection::{
    Confidence, DEFAULT_MAX_OUTPUT_TOKENS, Priorities, Recommendation, RequiredCapabilities, ScoreBreakdown,
    SelectionCriteria, SelectionEngine,
};
pub use switchboard_config::{Lifecycle, Tier};
