use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{Result, RubricaError};
use crate::models::GeneratedContent;

use super::anthropic;
use super::openai;
use super::reply::ProviderReply;

pub const MISSING_CREDENTIAL_MESSAGE: &str = "APIキーが設定されていません";
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "API呼び出しに失敗しました";

/// Upstream text-generation provider used by the prompt proxy.
///
/// Each call issues exactly one upstream request: no retry, no streaming, no
/// caching.
#[derive(Debug, Clone)]
pub struct LlmProvider {
    config: Arc<ProviderConfig>,
    http: Client,
}

impl LlmProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        let http = builder.build().map_err(|error| {
            RubricaError::Internal(format!("Failed to create LLM HTTP client: {error}"))
        })?;

        Ok(Self {
            config: Arc::new(config.clone()),
            http,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Call the configured provider once and return its raw reply.
    pub async fn generate(&self, prompt: &str, max_tokens: Option<u32>) -> Result<ProviderReply> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| RubricaError::MissingCredential(MISSING_CREDENTIAL_MESSAGE.to_string()))?;

        let max_tokens = max_tokens.unwrap_or(self.config.default_max_tokens);

        tracing::info!(
            provider = %self.config.kind,
            model = %self.config.model,
            max_tokens,
            prompt_len = prompt.chars().count(),
            "Forwarding prompt to LLM provider"
        );

        let reply = match self.config.kind {
            ProviderKind::Anthropic => ProviderReply::Anthropic(
                anthropic::create_message(&self.http, &self.config, api_key, prompt, max_tokens)
                    .await?,
            ),
            ProviderKind::OpenAI => ProviderReply::OpenAI(
                openai::create_chat_completion(
                    &self.http,
                    &self.config,
                    api_key,
                    prompt,
                    max_tokens,
                )
                .await?,
            ),
        };

        Ok(reply)
    }

    /// Call the provider and normalize the reply into the canonical envelope.
    pub async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> Result<GeneratedContent> {
        self.generate(prompt, max_tokens).await?.into_content()
    }
}

/// Turn a non-2xx upstream response into an error carrying the same status.
///
/// Both providers nest the human-readable message under `error.message`.
pub(super) async fn upstream_error(response: reqwest::Response) -> RubricaError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| extract_error_message(&value))
        .unwrap_or_else(|| UPSTREAM_FALLBACK_MESSAGE.to_string());

    tracing::error!(
        status = status.as_u16(),
        body_preview = %body.chars().take(200).collect::<String>(),
        "LLM provider returned an error"
    );

    RubricaError::Upstream {
        status: status.as_u16(),
        message,
    }
}

fn extract_error_message(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
