use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub provider: ProviderStatus,
    pub notifier: NotifierStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub credential_configured: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifierStatus {
    pub webhook_configured: bool,
}

/// `GET /api/health`
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    let provider = ProviderStatus {
        name: state.llm.kind().to_string(),
        model: state.llm.config().model.clone(),
        credential_configured: state.llm.has_credential(),
    };

    let status = if provider.credential_configured {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider,
        notifier: NotifierStatus {
            webhook_configured: state.notifier.is_enabled(),
        },
    })
}
