//! Conversion to the `OpenAI` chat completion wire format

use crate::protocol::openai::{OpenAiMessage, OpenAiRequest, OpenAiResponseFormat};
use crate::request::{GenerationRequest, OutputFormat};

const JSON_MODE_HINT: &str = "Respond in JSON.";

/// Build an `OpenAI`-compatible chat completion request
pub fn build(request: &GenerationRequest) -> OpenAiRequest {
    let json_mode = request.output_format == OutputFormat::Json && request.native_json;
    let mut system = request.effective_system_prompt();

    // JSON mode is refused unless the conversation mentions JSON
    if json_mode && !mentions_json(system.as_deref()) && !mentions_json(Some(&request.prompt)) {
        system = Some(match system {
            Some(existing) => format!("{existing}\n\n{JSON_MODE_HINT}"),
            None => JSON_MODE_HINT.to_owned(),
        });
    }

    let mut messages = Vec::with_capacity(2);
    if let Some(content) = system {
        messages.push(OpenAiMessage {
            role: "system".to_owned(),
            content,
        });
    }
    messages.push(OpenAiMessage {
        role: "user".to_owned(),
        content: request.prompt.clone(),
    });

    OpenAiRequest {
        model: request.model.clone(),
        messages,
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        response_format: json_mode.then(|| OpenAiResponseFormat {
            format_type: "json_object".to_owned(),
        }),
    }
}

fn mentions_json(text: Option<&str>) -> bool {
    text.is_some_and(|t| t.to_ascii_lowercase().contains("json"))
}
