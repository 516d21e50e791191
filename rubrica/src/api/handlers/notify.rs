use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::models::NotificationEvent;
use crate::services::Delivery;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct NotifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Delivery> for NotifyResponse {
    fn from(delivery: Delivery) -> Self {
        match delivery {
            Delivery::Skipped => Self {
                success: true,
                message: Some("Webhook not configured".to_string()),
                error: None,
            },
            Delivery::Delivered => Self {
                success: true,
                message: None,
                error: None,
            },
            Delivery::Failed(e) => Self {
                success: true,
                message: None,
                error: Some(e),
            },
        }
    }
}

/// `POST /api/notify`
///
/// Always answers 200 so that telemetry can never break the caller. The body
/// is parsed leniently; an empty or malformed body is treated as an empty
/// first-use event.
#[utoipa::path(
    post,
    path = "/api/notify",
    tag = "notify",
    request_body = NotificationEvent,
    responses(
        (status = 200, description = "Notification accepted", body = NotifyResponse),
    )
)]
pub async fn notify(State(state): State<AppState>, body: Bytes) -> Json<NotifyResponse> {
    let event = parse_event(&body);
    info!(kind = ?event.event_kind(), "Received usage notification");

    Json(state.notifier.notify(&event).await.into())
}

fn parse_event(body: &[u8]) -> NotificationEvent {
    if body.iter().all(u8::is_ascii_whitespace) {
        return NotificationEvent::default();
    }

    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!("Unparseable notification body, using defaults: {}", e);
        NotificationEvent::default()
    })
}
