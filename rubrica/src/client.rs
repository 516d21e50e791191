//! HTTP client for a running rubrica server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, RubricaError};
use crate::models::{GeneratedContent, GenerationRequest, NotificationEvent};
use crate::workflow::RubricGenerator;

const API_FALLBACK_MESSAGE: &str = "API呼び出しエラー";

#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: Client,
    base_url: String,
}

impl ProxyClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| RubricaError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/generate`. Any `{error: {message}}` body becomes an error.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        let url = format!("{}/api/generate", self.base_url);
        debug!("Requesting generation from {}", url);

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or(API_FALLBACK_MESSAGE)
                .to_string();
            return Err(RubricaError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_value(body)?)
    }

    /// `POST /api/notify`. Best-effort: failures are logged and ignored.
    pub async fn notify(&self, event: &NotificationEvent) {
        let url = format!("{}/api/notify", self.base_url);
        let result = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(10))
            .json(event)
            .send()
            .await;

        if let Err(e) = result {
            warn!("Failed to send usage notification: {}", e);
        }
    }
}

#[async_trait]
impl RubricGenerator for ProxyClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        ProxyClient::generate(self, request).await
    }
}
