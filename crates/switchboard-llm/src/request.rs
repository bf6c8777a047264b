//! Inbound generation requests

use serde::{Deserialize, Serialize};
use switchboard_routing::{Priorities, TaskCategory, Tier};

use crate::error::LlmError;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default output token budget
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = switchboard_routing::DEFAULT_MAX_OUTPUT_TOKENS;

const MAX_TEMPERATURE: f64 = 2.0;

/// Output format hint passed to the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Abstract "generate text" request
///
/// Deserializes from the camelCase inbound shape
/// (`prompt`, `systemPrompt`, `modelId`, `temperature`, `maxOutputTokens`, `outputFormat`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// User prompt, required and non-empty
    pub prompt: String,
    /// Optional system prompt
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Explicit model; selected automatically when absent
    #[serde(default, rename = "modelId")]
    pub model: Option<String>,
    /// Sampling temperature, 0 to 2
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Output token budget
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    /// Text or JSON output
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Model to favor during automatic selection
    #[serde(default)]
    pub preferred_model: Option<String>,
    /// Task category; inferred from the prompt when absent
    #[serde(skip)]
    pub task: Option<TaskCategory>,
    /// Selection priorities
    #[serde(skip)]
    pub priorities: Priorities,
    /// Caller's subscription tier; the dispatcher default applies when absent
    #[serde(skip)]
    pub subscription_tier: Option<Tier>,
    /// Only image-capable models earn the vision feature bonus
    #[serde(skip)]
    pub require_vision: bool,
}

impl DispatchRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Favor `model` during automatic selection without forcing it
    #[must_use]
    pub fn with_preferred_model(mut self, model: impl Into<String>) -> Self {
        self.preferred_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub const fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    #[must_use]
    pub const fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    #[must_use]
    pub const fn with_task(mut self, task: TaskCategory) -> Self {
        self.task = Some(task);
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS)
    }

    /// Reject requests that can never succeed
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest("prompt must not be empty".to_owned()));
        }

        let temperature = self.temperature();
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(LlmError::InvalidRequest(format!(
                "temperature must be between 0 and {MAX_TEMPERATURE}, got {temperature}"
            )));
        }

        if self.max_output_tokens() == 0 {
            return Err(LlmError::InvalidRequest("max output tokens must be greater than 0".to_owned()));
        }

        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(LlmError::InvalidRequest("model id must not be blank".to_owned()));
        }

        Ok(())
    }
}

/// A request resolved against one concrete model, ready for a wire builder
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub output_format: OutputFormat,
    /// The model supports a native JSON output mode
    pub native_json: bool,
}

impl GenerationRequest {
    /// System prompt with a JSON instruction appended when JSON output is
    /// requested and the model has no native JSON mode
    pub fn effective_system_prompt(&self) -> Option<String> {
        const JSON_HINT: &str = "Respond with a single valid JSON value and no surrounding prose.";

        match (self.output_format, self.native_json, &self.system_prompt) {
            (OutputFormat::Json, false, Some(system)) => Some(format!("{system}\n\n{JSON_HINT}")),
            (OutputFormat::Json, false, None) => Some(JSON_HINT.to_owned()),
            (_, _, system) => system.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let request = DispatchRequest::new("hi");
        assert!((request.temperature() - 0.7).abs() < f64::EPSILON);
        assert_eq!(request.max_output_tokens(), 2000);
        assert_eq!(request.output_format, OutputFormat::Text);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn inbound_json_shape() {
        let request: DispatchRequest = serde_json::from_str(
            r#"{"prompt":"hello","systemPrompt":"be brief","modelId":"gpt-4o-mini","temperature":0.2,"maxOutputTokens":64,"outputFormat":"json"}"#,
        )
        .unwrap();

        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(request.max_output_tokens(), 64);
        assert_eq!(request.output_format, OutputFormat::Json);
    }

    #[test]
    fn blank_prompt_rejected() {
        let err = DispatchRequest::new("   ").validate().unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[test]
    fn temperature_range_enforced() {
        assert!(DispatchRequest::new("x").with_temperature(2.0).validate().is_ok());
        assert!(DispatchRequest::new("x").with_temperature(0.0).validate().is_ok());
        assert!(DispatchRequest::new("x").with_temperature(2.5).validate().is_err());
        assert!(DispatchRequest::new("x").with_temperature(-0.1).validate().is_err());
        assert!(DispatchRequest::new("x").with_temperature(f64::NAN).validate().is_err());
    }

    #[test]
    fn zero_output_budget_rejected() {
        assert!(DispatchRequest::new("x").with_max_output_tokens(0).validate().is_err());
    }

    #[test]
    fn json_hint_only_without_native_mode() {
        let mut generation = GenerationRequest {
            model: "m".into(),
            prompt: "p".into(),
            system_prompt: Some("sys".into()),
            temperature: 0.7,
            max_tokens: 10,
            output_format: OutputFormat::Json,
            native_json: true,
        };
        assert_eq!(generation.effective_system_prompt().as_deref(), Some("sys"));

        generation.native_json = false;
        let system = generation.effective_system_prompt().unwrap();
        assert!(system.starts_with("sys\n\n"));
        assert!(system.contains("JSON"));
    }
}
