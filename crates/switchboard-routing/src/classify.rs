//! Heuristic task classification for prompts
//!
//! Keyword and pattern matching only. The category feeds the affinity
//! term of the selection score.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Broad kind of work a prompt asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Conversational or general questions
    #[default]
    Chat,
    /// Articles, product copy, marketing text
    ContentGeneration,
    /// Code generation, debugging, review
    Code,
    /// Data analysis and interpretation
    Analysis,
    /// Condensing a longer text
    Summarization,
    /// Converting text between languages
    Translation,
    /// Stories, poems, fiction
    Creative,
    /// Math, logic, multi-step problem solving
    Reasoning,
}

impl TaskCategory {
    pub const ALL: [Self; 8] = [
        Self::Chat,
        Self::ContentGeneration,
        Self::Code,
        Self::Analysis,
        Self::Summarization,
        Self::Translation,
        Self::Creative,
        Self::Reasoning,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::ContentGeneration => "content_generation",
            Self::Code => "code",
            Self::Analysis => "analysis",
            Self::Summarization => "summarization",
            Self::Translation => "translation",
            Self::Creative => "creative",
            Self::Reasoning => "reasoning",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");

        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| RoutingError::UnknownTaskCategory { name: s.to_owned() })
    }
}

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\w*\n").unwrap());

static FILE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w./\\-]+\.(rs|ts|tsx|js|jsx|py|go|java|cpp|c|h|rb|php|swift|kt|sql)\b").unwrap());

static FUNC_SIG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:fn |def |func |function |pub fn |async fn |class |const |let |var )\w+\s*[\(<{=]").unwrap()
});

static LATEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(?:frac|sum|int|prod|lim|sqrt|begin\{equation\})").unwrap());

static ANALYSIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:analy[sz]e|analysis|correlat\w*|regression|distribution|dataset|csv|dataframe|metrics|trend|outlier|compare the data)\b")
        .unwrap()
});

static TRANSLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btranslat\w*\b.*\b(?:to|into|from)\b|\bin (?:french|spanish|german|italian|portuguese|japanese|chinese|korean|arabic|russian|dutch)\b")
        .unwrap()
});

static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:summari[sz]e|summary|tl;?dr|condense|key points|recap|shorten this)\b").unwrap()
});

const CODE_KEYWORDS: &[&str] = &[
    "implement",
    "debug",
    "refactor",
    "compile",
    "runtime error",
    "syntax error",
    "code review",
    "write a program",
    "write code",
    "write a function",
    "fix this code",
    "bug in",
    "stack trace",
    "unit test",
    "regex for",
];

const REASONING_KEYWORDS: &[&str] = &[
    "calculate",
    "solve",
    "prove",
    "equation",
    "theorem",
    "derivative",
    "integral",
    "probability",
    "step by step",
    "logic puzzle",
    "reason through",
];

const CREATIVE_KEYWORDS: &[&str] = &[
    "write a story",
    "write a poem",
    "short story",
    "poem about",
    "creative writing",
    "fictional",
    "narrative",
    "tell me a story",
    "song lyrics",
    "haiku",
];

const CONTENT_KEYWORDS: &[&str] = &[
    "blog post",
    "article",
    "product description",
    "newsletter",
    "landing page",
    "marketing copy",
    "press release",
    "seo",
    "social media post",
    "headline",
    "email campaign",
];

/// Infer a task category from prompt text
///
/// Checks run from most to least specific; anything unmatched is chat.
pub fn classify_prompt(prompt: &str) -> TaskCategory {
    let lower = prompt.to_lowercase();

    if is_code(&lower, prompt) {
        TaskCategory::Code
    } else if TRANSLATE_RE.is_match(&lower) {
        TaskCategory::Translation
    } else if SUMMARY_RE.is_match(&lower) {
        TaskCategory::Summarization
    } else if is_reasoning(&lower, prompt) {
        TaskCategory::Reasoning
    } else if ANALYSIS_RE.is_match(&lower) {
        TaskCategory::Analysis
    } else if contains_any(&lower, CREATIVE_KEYWORDS) {
        TaskCategory::Creative
    } else if contains_any(&lower, CONTENT_KEYWORDS) {
        TaskCategory::ContentGeneration
    } else {
        TaskCategory::Chat
    }
}

fn is_code(lower: &str, original: &str) -> bool {
    CODE_FENCE_RE.is_match(original)
        || FILE_PATH_RE.is_match(original)
        || FUNC_SIG_RE.is_match(original)
        || contains_any(lower, CODE_KEYWORDS)
}

fn is_reasoning(lower: &str, original: &str) -> bool {
    LATEX_RE.is_match(original) || contains_any(lower, REASONING_KEYWORDS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
