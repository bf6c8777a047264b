//! Builders from resolved generation requests to provider wire payloads
//!
//! Each submodule handles one protocol family.

pub mod anthropic;
pub mod google;
pub mod openai;

use serde_json::Value;
use switchboard_routing::{Provider, ProviderFamily};

use crate::error::LlmError;
use crate::request::GenerationRequest;

/// A provider-specific call, ready for a [`crate::transport::Transport`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    /// Provider to send the call to
    pub provider: Provider,
    /// Model identifier
    pub model: String,
    /// Native request body
    pub body: Value,
}

impl ProviderCall {
    pub const fn family(&self) -> ProviderFamily {
        self.provider.family()
    }
}

/// Build the native payload for a provider
pub fn build_call(provider: &Provider, request: &GenerationRequest) -> Result<ProviderCall, LlmError> {
    let body = match provider.family() {
        ProviderFamily::OpenAiCompatible => to_value(&openai::build(request))?,
        ProviderFamily::Anthropic => to_value(&anthropic::build(request))?,
        ProviderFamily::Google => to_value(&google::build(request))?,
        ProviderFamily::Unknown => {
            return Err(LlmError::UnsupportedProvider {
                provider: provider.to_string(),
            });
        }
    };

    Ok(ProviderCall {
        provider: provider.clone(),
        model: request.model.clone(),
        body,
    })
}

fn to_value(payload: &impl serde::Serialize) -> Result<Value, LlmError> {
    serde_json::to_value(payload).map_err(|e| LlmError::Internal(format!("failed to encode request: {e}")))
}
