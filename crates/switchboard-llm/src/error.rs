use std::fmt;
use std::time::Duration;

use serde::Serialize;
use switchboard_routing::RoutingError;
use thiserror::Error;

/// Caller-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing credential, unknown model, model not on the allowlist
    Configuration,
    /// Timeout, rate limit, network or upstream fault; retryable
    Transient,
    /// Non-retryable provider failure, or retries exhausted
    TerminalFailure,
    /// No model satisfies the request's constraints
    SelectionImpossible,
    /// The request itself is malformed
    InvalidRequest,
    /// The caller cancelled the dispatch
    Cancelled,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transient => "transient",
            Self::TerminalFailure => "terminal_failure",
            Self::SelectionImpossible => "selection_impossible",
            Self::InvalidRequest => "invalid_request",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while dispatching a generation request
///
/// Messages never include credential values.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Catalog lookup or model selection failed
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Model is not on the active allowlist
    #[error("model '{model}' is not on the allowlist")]
    ModelNotAllowed { model: String },

    /// No credentials are configured for the model's provider
    #[error("no credentials configured for provider '{provider}'")]
    MissingCredential { provider: String },

    /// Provider has no known wire protocol
    #[error("provider '{provider}' is not supported for dispatch")]
    UnsupportedProvider { provider: String },

    /// Model is past its sunset date
    #[error("model '{model}' has been sunset")]
    ModelSunset { model: String },

    /// Request failed validation before any call was made
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A single attempt exceeded its timeout
    #[error("provider call timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    /// Provider signalled rate limiting
    #[error("rate limited by provider")]
    RateLimited {
        /// Seconds the provider asked us to wait, if given
        retry_after: Option<u64>,
    },

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Provider returned a retryable server error
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider rejected the credentials
    #[error("provider rejected credentials ({status})")]
    Authentication { status: u16 },

    /// Provider rejected the request as invalid
    #[error("provider rejected request {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Every allowed attempt failed with a transient error
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },

    /// The caller cancelled the operation
    #[error("dispatch cancelled")]
    Cancelled,

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl LlmError {
    /// Taxonomy bucket for this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Routing(RoutingError::SelectionImpossible { .. }) => ErrorKind::SelectionImpossible,
            Self::Routing(RoutingError::UnknownTaskCategory { .. }) | Self::InvalidRequest(_) | Self::Rejected { .. } => {
                ErrorKind::InvalidRequest
            }
            Self::Routing(_)
            | Self::ModelNotAllowed { .. }
            | Self::MissingCredential { .. }
            | Self::UnsupportedProvider { .. }
            | Self::ModelSunset { .. } => ErrorKind::Configuration,
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Network(_) | Self::Upstream { .. } => {
                ErrorKind::Transient
            }
            Self::Authentication { .. } | Self::RetriesExhausted { .. } | Self::Internal(_) => ErrorKind::TerminalFailure,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether another attempt may succeed
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }
}
