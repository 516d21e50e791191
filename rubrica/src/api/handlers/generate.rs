use axum::extract::State;
use axum::Json;
use tracing::error;

use crate::api::extractors::AppJson;
use crate::api::state::AppState;
use crate::error::{Result, RubricaError};
use crate::models::{GeneratedContent, GenerationRequest};

use super::ErrorBody;

pub const PROMPT_REQUIRED_MESSAGE: &str = "プロンプトが指定されていません";

/// `POST /api/generate`
///
/// Forwards one prompt to the configured provider and returns the reply in
/// the canonical `{content: [{type, text}]}` shape. Upstream error statuses
/// are relayed as-is.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "generate",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Generated text", body = GeneratedContent),
        (status = 400, description = "Missing prompt", body = ErrorBody),
        (status = 405, description = "Method not allowed", body = ErrorBody),
        (status = 500, description = "Missing credential or transport failure", body = ErrorBody),
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerationRequest>,
) -> Result<Json<GeneratedContent>> {
    let Some(prompt) = request.prompt() else {
        return Err(RubricaError::Validation(PROMPT_REQUIRED_MESSAGE.to_string()));
    };

    match state.llm.complete(prompt, request.max_tokens).await {
        Ok(content) => Ok(Json(content)),
        Err(e) => {
            error!(provider = %state.llm.kind(), "Generation failed: {}", e);
            Err(e)
        }
    }
}
