use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::{Result, RubricaError};

use super::provider::upstream_error;

/// The part of a chat completion reply the proxy reads.
///
/// Only `choices[].message.content` matters; OpenAI-compatible servers
/// differ in everything else, including `finish_reason` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
}

fn build_request(model: &str, prompt: &str, max_tokens: u32) -> Result<CreateChatCompletionRequest> {
    let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
        .content(prompt)
        .build()
        .map_err(|error| RubricaError::Validation(format!("Invalid user prompt: {error}")))?
        .into()];

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .max_tokens(max_tokens)
        .messages(messages)
        .build()
        .map_err(|error| RubricaError::Internal(format!("Invalid LLM completion request: {error}")))
}

/// Send one chat completion request. The request and response bodies use the
/// `async-openai` wire types; transport is a plain reqwest call so that the
/// upstream status can be relayed and no client-side retry happens.
pub(super) async fn create_chat_completion(
    http: &Client,
    config: &ProviderConfig,
    api_key: &str,
    prompt: &str,
    max_tokens: u32,
) -> Result<ChatCompletion> {
    let url = format!("{}/chat/completions", config.base_url());
    let request = build_request(&config.model, prompt, max_tokens)?;

    tracing::debug!("Sending OpenAI request to {}", url);

    let response = http
        .post(&url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }

    Ok(response.json().await?)
}
