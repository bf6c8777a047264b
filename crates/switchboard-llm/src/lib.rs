//! Generation dispatch for switchboard
//!
//! Turns an abstract "generate text" request into a call against one of
//! several LLM vendors (`OpenAI`-compatible, Anthropic, Google), with
//! allowlisting, timeouts, retries, response normalization, and cost
//! accounting.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod protocol;
pub mod request;
pub mod resilience;
pub mod transport;

pub use convert::{ProviderCall, build_call};
pub use dispatch::{ComparisonOutcome, ComparisonReport, DispatchResult, Dispatcher};
pub use error::{ErrorKind, LlmError};
pub use normalize::{ContentFormat, FinishReason, NormalizedResponse, TokenUsage, detect_family, detect_format, normalize};
pub use request::{DispatchRequest, GenerationRequest, OutputFormat};
pub use resilience::{CallPolicy, Execution, ModelAllowlist, ResilienceHarness};
pub use transport::{Endpoint, HttpTransport, Transport};
