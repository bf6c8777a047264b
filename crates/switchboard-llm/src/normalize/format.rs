//! Content format classification

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Detected shape of generated content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Text,
    Json,
    Xml,
    Markdown,
}

impl std::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Markdown => "markdown",
        })
    }
}

static FENCED_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A```(?:json|JSON)?[ \t]*\r?\n(.*?)\r?\n?```\z").unwrap());

static XML_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A<([A-Za-z_][\w:.-]*)[^>]*?(/?)>").unwrap());

static MD_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+\S").unwrap());

static MD_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^```").unwrap());

static MD_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\|.*\|\s*$\n^\|[\s:|-]+\|\s*$").unwrap());

static MD_LIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+\S").unwrap());

static MD_EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*[^*\n]+\*\*|__[^_\n]+__").unwrap());

static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]\n]+\]\([^)\s]+\)").unwrap());

/// Classify content as JSON, XML, Markdown, or plain text
///
/// JSON wrapped in a single fenced block (```` ```json ````) counts as JSON.
pub fn detect_format(content: &str) -> ContentFormat {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return ContentFormat::Text;
    }

    if is_json(trimmed) {
        return ContentFormat::Json;
    }

    if is_xml(trimmed) {
        return ContentFormat::Xml;
    }

    if is_markdown(trimmed) {
        return ContentFormat::Markdown;
    }

    ContentFormat::Text
}

/// The JSON payload of content, unwrapping a fenced block if present
pub fn json_body(content: &str) -> Option<&str> {
    let trimmed = content.trim();

    if let Some(captures) = FENCED_JSON_RE.captures(trimmed) {
        let inner = captures.get(1)?.as_str().trim();
        return parses_as_json(inner).then_some(inner);
    }

    parses_as_json(trimmed).then_some(trimmed)
}

fn is_json(trimmed: &str) -> bool {
    json_body(trimmed).is_some()
}

fn parses_as_json(text: &str) -> bool {
    (text.starts_with('{') || text.starts_with('[')) && serde_json::from_str::<serde_json::Value>(text).is_ok()
}

fn is_xml(trimmed: &str) -> bool {
    if trimmed.starts_with("<?xml") {
        return true;
    }

    let Some(captures) = XML_OPEN_RE.captures(trimmed) else {
        return false;
    };

    let name = &captures[1];
    let self_closing = !captures[2].is_empty();

    if self_closing {
        return captures[0].len() == trimmed.len();
    }

    trimmed.ends_with(&format!("</{name}>"))
}

fn is_markdown(trimmed: &str) -> bool {
    if MD_HEADING_RE.is_match(trimmed) || MD_FENCE_RE.is_match(trimmed) || MD_TABLE_RE.is_match(trimmed) {
        return true;
    }

    let weak_signals = [&*MD_LIST_RE, &*MD_EMPHASIS_RE, &*MD_LINK_RE]
        .iter()
        .filter(|re| re.is_match(trimmed))
        .count();

    weak_signals >= 2 || MD_LIST_RE.find_iter(trimmed).count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text() {
        assert_eq!(detect_format("The sky is blue."), ContentFormat::Text);
        assert_eq!(detect_format(""), ContentFormat::Text);
        assert_eq!(detect_format("   \n "), ContentFormat::Text);
    }

    #[test]
    fn json_objects_and_arrays() {
        assert_eq!(detect_format(r#"{"a": 1}"#), ContentFormat::Json);
        assert_eq!(detect_format("  [1, 2, 3]\n"), ContentFormat::Json);
    }

    #[test]
    fn invalid_json_is_not_json() {
        assert_eq!(detect_format("{not json}"), ContentFormat::Text);
    }

    #[test]
    fn fenced_json() {
        let content = "```json\n{\"colors\": [\"red\", \"green\"]}\n```";
        assert_eq!(detect_format(content), ContentFormat::Json);
        assert_eq!(json_body(content), Some("{\"colors\": [\"red\", \"green\"]}"));
    }

    #[test]
    fn fenced_non_json_is_markdown() {
        assert_eq!(detect_format("```rust\nfn main() {}\n```"), ContentFormat::Markdown);
    }

    #[test]
    fn xml_documents() {
        assert_eq!(detect_format("<?xml version=\"1.0\"?><a/>"), ContentFormat::Xml);
        assert_eq!(detect_format("<note><to>Tove</to></note>"), ContentFormat::Xml);
        assert_eq!(detect_format("<br/>"), ContentFormat::Xml);
        assert_eq!(detect_format("<b>bold</b> and more"), ContentFormat::Text);
    }

    #[test]
    fn markdown_signals() {
        assert_eq!(detect_format("# Title\n\nBody"), ContentFormat::Markdown);
        assert_eq!(detect_format("- one\n- two"), ContentFormat::Markdown);
        assert_eq!(detect_format("See **this** and [docs](https://x.dev)"), ContentFormat::Markdown);
        assert_eq!(detect_format("| a | b |\n|---|---|\n| 1 | 2 |"), ContentFormat::Markdown);
        assert_eq!(detect_format("Just **one** emphasis"), ContentFormat::Text);
    }
}
