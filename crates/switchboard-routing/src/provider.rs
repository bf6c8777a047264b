//! Known model vendors and the protocol family each one speaks

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

/// A model vendor
///
/// Names outside the known set parse into [`Provider::Unknown`] so that
/// catalog entries for new vendors still load; such entries can be
/// listed and scored but never dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Groq,
    Mistral,
    DeepSeek,
    OpenRouter,
    Unknown(String),
}

/// Wire protocol family shared by a group of providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ProviderFamily {
    /// `/chat/completions` with a `choices` array
    OpenAiCompatible,
    /// Anthropic Messages API with a `content` block array
    Anthropic,
    /// Google `generateContent` with a `candidates` array
    Google,
    /// No known protocol
    Unknown,
}

/// Relative responsiveness class used for speed preferences and latency estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedClass {
    Fast,
    Quick,
    Standard,
    Unrated,
}

impl Provider {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Groq => "groq",
            Self::Mistral => "mistral",
            Self::DeepSeek => "deepseek",
            Self::OpenRouter => "openrouter",
            Self::Unknown(name) => name.as_str(),
        }
    }

    /// Protocol family used to build requests and normalize responses
    pub const fn family(&self) -> ProviderFamily {
        match self {
            Self::OpenAi | Self::Groq | Self::Mistral | Self::DeepSeek | Self::OpenRouter => {
                ProviderFamily::OpenAiCompatible
            }
            Self::Anthropic => ProviderFamily::Anthropic,
            Self::Google => ProviderFamily::Google,
            Self::Unknown(_) => ProviderFamily::Unknown,
        }
    }

    /// Speed class of the provider's serving infrastructure
    pub const fn speed_class(&self) -> SpeedClass {
        match self {
            Self::Groq => SpeedClass::Fast,
            Self::Google | Self::Mistral => SpeedClass::Quick,
            Self::OpenAi | Self::Anthropic => SpeedClass::Standard,
            Self::DeepSeek | Self::OpenRouter | Self::Unknown(_) => SpeedClass::Unrated,
        }
    }

    /// Whether this is a recognised vendor
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl FromStr for Provider {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();

        Ok(match normalized.as_str() {
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            "google" | "gemini" => Self::Google,
            "groq" => Self::Groq,
            "mistral" => Self::Mistral,
            "deepseek" => Self::DeepSeek,
            "openrouter" => Self::OpenRouter,
            _ => Self::Unknown(normalized),
        })
    }
}

impl From<&str> for Provider {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(provider) => provider,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!(Provider::from("OpenAI"), Provider::OpenAi);
        assert_eq!(Provider::from(" gemini "), Provider::Google);
        assert_eq!(Provider::from("deepseek"), Provider::DeepSeek);
    }

    #[test]
    fn unknown_vendor_is_explicit() {
        let provider = Provider::from("Acme-AI");
        assert_eq!(provider, Provider::Unknown("acme-ai".to_owned()));
        assert_eq!(provider.family(), ProviderFamily::Unknown);
        assert!(!provider.is_known());
        assert_eq!(provider.to_string(), "acme-ai");
    }

    #[test]
    fn compatible_vendors_share_openai_family() {
        for provider in [Provider::OpenAi, Provider::Groq, Provider::Mistral, Provider::DeepSeek, Provider::OpenRouter] {
            assert_eq!(provider.family(), ProviderFamily::OpenAiCompatible);
        }
        assert_eq!(Provider::Anthropic.family(), ProviderFamily::Anthropic);
        assert_eq!(Provider::Google.family(), ProviderFamily::Google);
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Provider::Groq).unwrap();
        assert_eq!(json, "\"groq\"");
        let parsed: Provider = serde_json::from_str("\"anthropic\"").unwrap();
        assert_eq!(parsed, Provider::Anthropic);
    }
}
