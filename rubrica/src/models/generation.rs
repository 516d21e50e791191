use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
///
/// `prompt` is optional on the wire so that a missing prompt surfaces as a
/// 400 with a readable message instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Upper bound on generated tokens. Defaults to 3000 upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The prompt, if present and non-empty.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}

/// Canonical reply envelope returned by the proxy regardless of provider.
///
/// ```json
/// { "content": [ { "type": "text", "text": "..." } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GeneratedContent {
    pub content: Vec<ContentBlock>,
}

/// One block of generated content. The proxy only emits `"text"` blocks;
/// readers skip anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl ContentBlock {
    pub const TEXT: &'static str = "text";

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Self::TEXT.to_string(),
            text: text.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == Self::TEXT
    }
}

impl GeneratedContent {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Text of the first text block, or an empty string when there is none.
    pub fn text(&self) -> &str {
        self.content
            .iter()
            .find(|block| block.is_text())
            .map(|block| block.text.as_str())
            .unwrap_or_default()
    }
}
