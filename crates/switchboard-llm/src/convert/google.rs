//! Conversion to the Gemini `generateContent` wire format

use crate::protocol::google::{GoogleContent, GoogleGenerationConfig, GooglePart, GoogleRequest};
use crate::request::{GenerationRequest, OutputFormat};

/// Build a Gemini `generateContent` request
///
/// The model id travels in the URL path, not the body.
pub fn build(request: &GenerationRequest) -> GoogleRequest {
    let json_mode = request.output_format == OutputFormat::Json && request.native_json;

    GoogleRequest {
        contents: vec![GoogleContent {
            role: Some("user".to_owned()),
            parts: vec![text_part(&request.prompt)],
        }],
        system_instruction: request.effective_system_prompt().map(|system| GoogleContent {
            role: None,
            parts: vec![text_part(&system)],
        }),
        generation_config: GoogleGenerationConfig {
            temperature: Some(request.temperature),
            max_output_tokens: Some(request.max_tokens),
            response_mime_type: json_mode.then(|| "application/json".to_owned()),
        },
    }
}

fn text_part(text: &str) -> GooglePart {
    GooglePart {
        text: Some(text.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tests::generation;

    #[test]
    fn camel_case_body() {
        let wire = build(&generation(OutputFormat::Json, true));
        let body = serde_json::to_value(&wire).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 128);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn text_mode_has_no_mime_type() {
        let wire = build(&generation(OutputFormat::Text, true));
        assert!(wire.generation_config.response_mime_type.is_none());
    }
}
