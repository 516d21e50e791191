use crate::error::{Result, RubricaError};
use crate::models::GeneratedContent;

use super::anthropic::AnthropicMessage;
use super::openai::ChatCompletion;

/// A provider's raw reply, before normalization.
#[derive(Debug, Clone)]
pub enum ProviderReply {
    Anthropic(AnthropicMessage),
    OpenAI(ChatCompletion),
}

impl ProviderReply {
    /// Reshape into the canonical `{content: [{type: "text", text}]}` envelope.
    ///
    /// The envelope text is exactly the provider's textual reply, so callers
    /// never need to know which provider answered.
    pub fn into_content(self) -> Result<GeneratedContent> {
        let text = match self {
            ProviderReply::Anthropic(message) => message.text(),
            ProviderReply::OpenAI(response) => response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| RubricaError::Llm("LLM response contained no choices".to_string()))?
                .message
                .content
                .unwrap_or_default(),
        };

        Ok(GeneratedContent::from_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn openai_response(content: &str) -> ChatCompletion {
        serde_json::from_value(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-4o-mini",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }
            ]
        }))
        .unwrap()
    }

    fn anthropic_message(blocks: serde_json::Value) -> AnthropicMessage {
        serde_json::from_value(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": "claude-haiku-4-5-20251001",
            "content": blocks,
            "stop_reason": "end_turn"
        }))
        .unwrap()
    }

    #[test]
    fn test_both_providers_normalize_to_same_envelope() {
        let text = r#"{"criteria": []}"#;

        let from_openai = ProviderReply::OpenAI(openai_response(text))
            .into_content()
            .unwrap();
        let from_anthropic =
            ProviderReply::Anthropic(anthropic_message(json!([{"type": "text", "text": text}])))
                .into_content()
                .unwrap();

        assert_eq!(from_openai, from_anthropic);
        assert_eq!(from_openai.text(), text);
    }

    #[test]
    fn test_anthropic_text_blocks_are_concatenated() {
        let message = anthropic_message(json!([
            {"type": "text", "text": "first "},
            {"type": "tool_use", "id": "toolu_1", "name": "x", "input": {}},
            {"type": "text", "text": "second"}
        ]));

        let content = ProviderReply::Anthropic(message).into_content().unwrap();
        assert_eq!(content.text(), "first second");
    }

    #[test]
    fn test_openai_without_choices_is_an_error() {
        let mut response = openai_response("unused");
        response.choices.clear();

        let result = ProviderReply::OpenAI(response).into_content();
        assert!(matches!(result, Err(RubricaError::Llm(_))));
    }
}
