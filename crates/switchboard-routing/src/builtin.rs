//! Built-in catalog of vetted models
//!
//! Prices are USD per million tokens.

use switchboard_config::{Lifecycle, Tier};

use crate::catalog::{Capabilities, ModelDescriptor};
use crate::provider::Provider;

struct Entry {
    id: &'static str,
    provider: Provider,
    name: &'static str,
    tier: Tier,
    context_window: u32,
    max_output_tokens: u32,
    input: f64,
    output: f64,
    vision: bool,
    json_mode: bool,
    streaming: bool,
    recommended: bool,
    lifecycle: Lifecycle,
}

impl Entry {
    fn new(id: &'static str, provider: Provider, name: &'static str, tier: Tier) -> Self {
        Self {
            id,
            provider,
            name,
            tier,
            context_window: 0,
            max_output_tokens: 0,
            input: 0.0,
            output: 0.0,
            vision: false,
            json_mode: true,
            streaming: true,
            recommended: false,
            lifecycle: Lifecycle::Active,
        }
    }

    fn limits(mut self, context_window: u32, max_output_tokens: u32) -> Self {
        self.context_window = context_window;
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn price(mut self, input: f64, output: f64) -> Self {
        self.input = input;
        self.output = output;
        self
    }

    fn vision(mut self) -> Self {
        self.vision = true;
        self
    }

    fn no_json(mut self) -> Self {
        self.json_mode = false;
        self
    }

    fn recommended(mut self) -> Self {
        self.recommended = true;
        self
    }

    fn deprecated(mut self) -> Self {
        self.lifecycle = Lifecycle::Deprecated;
        self
    }

    fn into_descriptor(self) -> ModelDescriptor {
        ModelDescriptor {
            id: self.id.to_owned(),
            provider: self.provider,
            display_name: self.name.to_owned(),
            tier: self.tier,
            context_window: self.context_window,
            max_output_tokens: self.max_output_tokens,
            input_per_mtok: self.input,
            output_per_mtok: self.output,
            capabilities: Capabilities {
                vision: self.vision,
                json_mode: self.json_mode,
                streaming: self.streaming,
            },
            recommended: self.recommended,
            lifecycle: self.lifecycle,
        }
    }
}

/// Built-in model descriptors in catalog order
pub fn models() -> Vec<ModelDescriptor> {
    use Provider::{Anthropic, DeepSeek, Google, Groq, Mistral, OpenAi};
    use Tier::{Affordable, Free, Premium};

    [
        Entry::new("gpt-4o", OpenAi, "GPT-4o", Premium)
            .limits(128_000, 16_384)
            .price(2.5, 10.0)
            .vision()
            .recommended(),
        Entry::new("gpt-4o-mini", OpenAi, "GPT-4o mini", Affordable)
            .limits(128_000, 16_384)
            .price(0.15, 0.6)
            .vision()
            .recommended(),
        Entry::new("gpt-3.5-turbo", OpenAi, "GPT-3.5 Turbo", Affordable)
            .limits(16_385, 4_096)
            .price(0.5, 1.5)
            .deprecated(),
        Entry::new("claude-3-5-sonnet-20241022", Anthropic, "Claude 3.5 Sonnet", Premium)
            .limits(200_000, 8_192)
            .price(3.0, 15.0)
            .vision()
            .recommended(),
        Entry::new("claude-3-5-haiku-20241022", Anthropic, "Claude 3.5 Haiku", Affordable)
            .limits(200_000, 8_192)
            .price(0.8, 4.0),
        Entry::new("claude-3-opus-20240229", Anthropic, "Claude 3 Opus", Premium)
            .limits(200_000, 4_096)
            .price(15.0, 75.0)
            .vision()
            .deprecated(),
        Entry::new("gemini-1.5-pro", Google, "Gemini 1.5 Pro", Premium)
            .limits(2_000_000, 8_192)
            .price(1.25, 5.0)
            .vision(),
        Entry::new("gemini-1.5-flash", Google, "Gemini 1.5 Flash", Affordable)
            .limits(1_000_000, 8_192)
            .price(0.075, 0.3)
            .vision()
            .recommended(),
        Entry::new("llama-3.1-8b-instant", Groq, "Llama 3.1 8B Instant", Free)
            .limits(131_072, 8_192)
            .price(0.05, 0.08),
        Entry::new("llama-3.3-70b-versatile", Groq, "Llama 3.3 70B Versatile", Affordable)
            .limits(131_072, 32_768)
            .price(0.59, 0.79),
        Entry::new("gemma2-9b-it", Groq, "Gemma 2 9B", Free)
            .limits(8_192, 8_192)
            .price(0.2, 0.2)
            .no_json(),
        Entry::new("mistral-small-latest", Mistral, "Mistral Small", Affordable)
            .limits(32_000, 8_192)
            .price(0.2, 0.6),
        Entry::new("mistral-large-latest", Mistral, "Mistral Large", Premium)
            .limits(128_000, 8_192)
            .price(2.0, 6.0),
        Entry::new("deepseek-chat", DeepSeek, "DeepSeek Chat", Affordable)
            .limits(64_000, 8_192)
            .price(0.14, 0.28),
    ]
    .into_iter()
    .map(Entry::into_descriptor)
    .collect()
}
