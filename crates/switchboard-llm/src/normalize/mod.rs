//! Response normalization
//!
//! Maps each protocol family's native response to a [`NormalizedResponse`].
//! Normalization never fails: a payload no normalizer recognizes goes
//! through best-effort extraction and, at worst, yields empty content.

pub mod anthropic;
mod format;
pub mod google;
pub mod openai;

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use switchboard_routing::ProviderFamily;

pub use format::{ContentFormat, detect_format, json_body};

/// Canonical reason generation stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end or stop sequence
    Stop,
    /// Output token limit reached
    Length,
    /// Blocked by a safety or content policy
    ContentFilter,
    /// Model requested a tool call
    ToolCalls,
    /// Missing or unrecognized reason
    #[default]
    Unknown,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
            Self::ToolCalls => "tool_calls",
            Self::Unknown => "unknown",
        })
    }
}

/// Token counts for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    /// Usage with `total` falling back to `input + output`
    ///
    /// Counts come straight from provider payloads, so the sum saturates.
    pub fn new(input: u64, output: u64, total: Option<u64>) -> Self {
        Self {
            input,
            output,
            total: total.unwrap_or(input.saturating_add(output)),
        }
    }
}

/// Canonical result of a provider call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResponse {
    /// Generated text
    pub content: String,
    /// Detected content format
    pub format: ContentFormat,
    /// Reported token usage, if the provider sent any
    pub usage: Option<TokenUsage>,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Model reported by the provider
    pub model: Option<String>,
    /// Family whose normalizer produced this; `None` after best-effort extraction
    pub family: Option<ProviderFamily>,
    /// Original provider payload, for diagnostics
    #[serde(skip)]
    pub raw: Value,
}

/// Fields a family normalizer extracts before format detection
#[derive(Debug, Default)]
pub(crate) struct Extracted {
    pub content: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: FinishReason,
    pub model: Option<String>,
}

/// Normalize a provider payload
///
/// `family` is the protocol the payload is expected to follow; when it is
/// absent or the payload does not match it, the family is inferred from
/// structural hints before falling back to best-effort extraction.
pub fn normalize(raw: Value, family: Option<ProviderFamily>) -> NormalizedResponse {
    let attempt = |family: ProviderFamily| extract_with(family, &raw).map(|extracted| (family, extracted));

    let matched = family
        .and_then(attempt)
        .or_else(|| detect_family(&raw).filter(|detected| Some(*detected) != family).and_then(attempt));

    let (family, extracted) = match matched {
        Some((family, extracted)) => (Some(family), extracted),
        None => {
            tracing::warn!(expected = ?family, "unrecognized provider response shape, using best-effort extraction");
            (None, best_effort(&raw))
        }
    };

    NormalizedResponse {
        format: detect_format(&extracted.content),
        content: extracted.content,
        usage: extracted.usage,
        finish_reason: extracted.finish_reason,
        model: extracted.model,
        family,
        raw,
    }
}

fn extract_with(family: ProviderFamily, raw: &Value) -> Option<Extracted> {
    match family {
        ProviderFamily::OpenAiCompatible => openai::extract(raw),
        ProviderFamily::Anthropic => anthropic::extract(raw),
        ProviderFamily::Google => google::extract(raw),
        ProviderFamily::Unknown => None,
    }
}

/// Infer the protocol family from the payload's structure
///
/// Looks for a `choices`, `content`, or `candidates` array first, then for
/// vendor names in the reported model.
pub fn detect_family(raw: &Value) -> Option<ProviderFamily> {
    let is_array = |key: &str| raw.get(key).is_some_and(Value::is_array);

    if is_array("choices") {
        return Some(ProviderFamily::OpenAiCompatible);
    }
    if is_array("content") {
        return Some(ProviderFamily::Anthropic);
    }
    if is_array("candidates") {
        return Some(ProviderFamily::Google);
    }

    let model = raw
        .get("model")
        .or_else(|| raw.get("modelVersion"))
        .and_then(Value::as_str)?
        .to_ascii_lowercase();

    if model.contains("claude") {
        Some(ProviderFamily::Anthropic)
    } else if model.contains("gemini") || model.contains("gemma") {
        Some(ProviderFamily::Google)
    } else if ["gpt", "o1", "o3", "o4", "llama", "mistral", "mixtral", "deepseek"]
        .iter()
        .any(|hint| model.contains(hint))
    {
        Some(ProviderFamily::OpenAiCompatible)
    } else {
        None
    }
}

/// Content keys tried, in order, by best-effort extraction
const FALLBACK_KEYS: &[&str] = &[
    "content",
    "text",
    "output",
    "response",
    "message",
    "generated_text",
    "completion",
    "result",
];

/// Pull any plausible content out of an unrecognized payload
fn best_effort(raw: &Value) -> Extracted {
    Extracted {
        content: plausible_text(raw, 0).unwrap_or_default(),
        model: raw.get("model").and_then(Value::as_str).map(str::to_owned),
        ..Extracted::default()
    }
}

fn plausible_text(value: &Value, depth: usize) -> Option<String> {
    const MAX_DEPTH: usize = 3;

    if depth > MAX_DEPTH {
        return None;
    }

    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(|item| plausible_text(item, depth + 1)),
        Value::Object(map) => FALLBACK_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|inner| plausible_text(inner, depth + 1)),
        _ => None,
    }
}
