//! Gemini response normalization

use serde_json::Value;

use super::{Extracted, FinishReason, TokenUsage};
use crate::protocol::google::GoogleResponse;

/// Map a Gemini `finishReason` to the canonical reason
pub fn finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => FinishReason::ContentFilter,
        Some("MALFORMED_FUNCTION_CALL") => FinishReason::ToolCalls,
        _ => FinishReason::Unknown,
    }
}

pub(crate) fn extract(raw: &Value) -> Option<Extracted> {
    let response: GoogleResponse = serde_json::from_value(raw.clone()).ok()?;
    let candidate = response.candidates.into_iter().next();

    let (content, finish) = candidate.map_or_else(
        || (String::new(), FinishReason::Unknown),
        |candidate| {
            let text = candidate
                .content
                .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect::<String>())
                .unwrap_or_default();
            (text, finish_reason(candidate.finish_reason.as_deref()))
        },
    );

    Some(Extracted {
        content,
        usage: response.usage_metadata.map(|u| {
            TokenUsage::new(u.prompt_token_count, u.candidates_token_count, u.total_token_count)
        }),
        finish_reason: finish,
        model: response.model_version,
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
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "```json\n"}, {"text": "{\"a\": 1}\n```"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 9, "totalTokenCount": 16},
            "modelVersion": "gemini-1.5-flash"
        });

        let response = normalize(raw, Some(ProviderFamily::Google));
        assert_eq!(response.content, "```json\n{\"a\": 1}\n```");
        assert_eq!(response.format, ContentFormat::Json);
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage, Some(TokenUsage { input: 7, output: 9, total: 16 }));
        assert_eq!(response.model.as_deref(), Some("gemini-1.5-flash"));
    }

    #[test]
    fn blocked_candidate_without_content() {
        let extracted = extract(&json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert_eq!(extracted.content, "");
        assert_eq!(extracted.finish_reason, FinishReason::ContentFilter);
    }

    #[test]
    fn vendor_vocabulary() {
        assert_eq!(finish_reason(Some("MAX_TOKENS")), FinishReason::Length);
        assert_eq!(finish_reason(Some("OTHER")), FinishReason::Unknown);
    }
}
