//! Anthropic response normalization

use serde_json::Value;

use super::{Extracted, FinishReason, TokenUsage};
use crate::protocol::anthropic::{AnthropicResponse, AnthropicResponseBlock};

/// Map an Anthropic `stop_reason` to the canonical reason
pub fn finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("end_turn" | "stop_sequence") => FinishReason::Stop,
        Some("max_tokens") => FinishReason::Length,
        Some("tool_use") => FinishReason::ToolCalls,
        Some("refusal") => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}

pub(crate) fn extract(raw: &Value) -> Option<Extracted> {
    let response: AnthropicResponse = serde_json::from_value(raw.clone()).ok()?;

    // Text blocks are concatenated in order; other block kinds carry no text
    let content = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicResponseBlock::Text { text } => Some(text),
            AnthropicResponseBlock::Other => None,
        })
        .collect::<String>();

    Some(Extracted {
        content,
        usage: response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens, None)),
        finish_reason: finish_reason(response.stop_reason.as_deref()),
        model: response.model,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use switchboard_routing::ProviderFamily;

    use super::*;
    use crate::normalize::{ContentFormat, normalize};

    #[test]
    fn full_response() {
        let raw = json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-haiku-20241022",
            "content": [
                {"type": "text", "text": "# Colors\n\n"},
                {"type": "tool_use", "id": "t1", "name": "lookup", "input": {}},
                {"type": "text", "text": "- red\n- green"}
            ],
            "stop_reason": "max_tokens",
            "usage": {"input_tokens": 20, "output_tokens": 8}
        });

        let response = normalize(raw, Some(ProviderFamily::Anthropic));
        assert_eq!(response.content, "# Colors\n\n- red\n- green");
        assert_eq!(response.format, ContentFormat::Markdown);
        assert_eq!(response.finish_reason, FinishReason::Length);
        assert_eq!(response.usage, Some(TokenUsage { input: 20, output: 8, total: 28 }));
    }

    #[test]
    fn missing_usage_stays_absent() {
        let extracted = extract(&json!({"content": [{"type": "text", "text": "ok"}]})).unwrap();
        assert!(extracted.usage.is_none());
        assert_eq!(extracted.finish_reason, FinishReason::Unknown);
    }

    #[test]
    fn vendor_vocabulary() {
        assert_eq!(finish_reason(Some("end_turn")), FinishReason::Stop);
        assert_eq!(finish_reason(Some("stop_sequence")), FinishReason::Stop);
        assert_eq!(finish_reason(Some("tool_use")), FinishReason::ToolCalls);
        assert_eq!(finish_reason(Some("refusal")), FinishReason::ContentFilter);
    }
}
