use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rubrica API",
        version = "1.0.0",
        description = "Prompt proxy and usage notifier for the rubric authoring assistant.",
    ),
    paths(
        handlers::health::health_check,
        handlers::generate::generate,
        handlers::notify::notify,
    ),
    components(schemas(
        handlers::ErrorBody,
        handlers::ErrorMessage,
        handlers::NotifyResponse,
        handlers::health::HealthData,
        handlers::health::ProviderStatus,
        handlers::health::NotifierStatus,
        models::GenerationRequest,
        models::GeneratedContent,
        models::ContentBlock,
        models::NotificationEvent,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "generate", description = "Forward a prompt to the configured LLM provider"),
        (name = "notify", description = "Best-effort usage notifications to a chat webhook"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
