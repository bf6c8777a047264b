//! `OpenAI`-compatible response normalization

use serde_json::Value;

use super::{Extracted, FinishReason, TokenUsage};
use crate::protocol::openai::OpenAiResponse;

/// Map an `OpenAI` `finish_reason` to the canonical reason
pub fn finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some("tool_calls" | "function_call") => FinishReason::ToolCalls,
        _ => FinishReason::Unknown,
    }
}

pub(crate) fn extract(raw: &Value) -> Option<Extracted> {
    let response: OpenAiResponse = serde_json::from_value(raw.clone()).ok()?;
    let choice = response.choices.into_iter().next();

    let (content, finish) = match choice {
        Some(choice) => {
            let reason = finish_reason(choice.finish_reason.as_deref());
            match (choice.message.content, choice.message.refusal) {
                (Some(content), _) => (content, reason),
                (None, Some(refusal)) => (refusal, FinishReason::ContentFilter),
                (None, None) => (String::new(), reason),
            }
        }
        None => (String::new(), FinishReason::Unknown),
    };

    Some(Extracted {
        content,
        usage: response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens)),
        finish_reason: finish,
        model: response.model,
    })
}
