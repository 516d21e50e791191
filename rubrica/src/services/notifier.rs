use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info};

use crate::config::NotifyConfig;
use crate::error::{Result, RubricaError};
use crate::models::{local_timestamp, NotificationEvent};

/// Outcome of a best-effort notification. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No webhook configured; nothing was sent.
    Skipped,
    Delivered,
    Failed(String),
}

/// Posts usage events to a chat webhook.
///
/// Notification is telemetry: every failure is logged and reported as
/// [`Delivery::Failed`], never propagated to the caller.
#[derive(Debug, Clone)]
pub struct Notifier {
    webhook_url: Option<String>,
    http: Client,
}

impl Notifier {
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RubricaError::Internal(format!("Failed to create webhook client: {e}")))?;

        Ok(Self {
            webhook_url: config.webhook_url.clone(),
            http,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub async fn notify(&self, event: &NotificationEvent) -> Delivery {
        let Some(url) = self.webhook_url.as_deref() else {
            info!("SLACK_WEBHOOK_URL not configured, skipping notification");
            return Delivery::Skipped;
        };

        let mut event = event.clone();
        if event.timestamp.is_empty() {
            event.timestamp = local_timestamp();
        }

        let message = event.message();
        debug!(kind = ?event.event_kind(), "Posting notification to webhook");

        match self
            .http
            .post(url)
            .json(&json!({ "text": message }))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Delivery::Delivered,
            Ok(response) => {
                let status = response.status();
                error!("Webhook returned error status: {}", status);
                Delivery::Failed(format!("webhook returned {status}"))
            }
            Err(e) => {
                error!("Failed to post notification: {}", e);
                Delivery::Failed(e.to_string())
            }
        }
    }
}
