//! Conversion to the Anthropic Messages wire format

use crate::protocol::anthropic::{AnthropicMessage, AnthropicRequest};
use crate::request::GenerationRequest;

/// Build an Anthropic messages request
///
/// Anthropic has no native JSON mode, so JSON output is requested through
/// the system prompt.
pub fn build(request: &GenerationRequest) -> AnthropicRequest {
    let request = GenerationRequest {
        native_json: false,
        ..request.clone()
    };

    AnthropicRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
        system: request.effective_system_prompt(),
        messages: vec![AnthropicMessage {
            role: "user".to_owned(),
            content: request.prompt.clone(),
        }],
        // Anthropic caps temperature at 1.0
        temperature: Some(request.temperature.min(1.0)),
    }
}
