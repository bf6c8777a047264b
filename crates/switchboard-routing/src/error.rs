//! Catalog and selection error types

use thiserror::Error;

/// Errors raised by the catalog and the selection engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Requested model id is not in the catalog
    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    /// Two catalog entries share an id
    #[error("duplicate model id in catalog: {model}")]
    DuplicateModel { model: String },

    /// The catalog has no models to choose from
    #[error("model catalog is empty")]
    EmptyCatalog,

    /// No model satisfies the context-window or credential constraints
    #[error("no suitable model: {reason}")]
    SelectionImpossible { reason: String },

    /// Task category name did not match a known category
    #[error("unknown task category: {name}")]
    UnknownTaskCategory { name: String },
}
