use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::Result;

use super::provider::upstream_error;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Subset of the Messages API response the proxy relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub content: Vec<AnthropicContent>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl AnthropicMessage {
    /// Concatenated text of every `text` block.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect()
    }
}

pub(super) async fn create_message(
    http: &Client,
    config: &ProviderConfig,
    api_key: &str,
    prompt: &str,
    max_tokens: u32,
) -> Result<AnthropicMessage> {
    let url = format!("{}/messages", config.base_url());
    let body = MessagesRequest {
        model: &config.model,
        max_tokens,
        messages: [UserMessage {
            role: "user",
            content: prompt,
        }],
    };

    tracing::debug!("Sending Anthropic request to {}", url);

    let response = http
        .post(&url)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }

    Ok(response.json().await?)
}
