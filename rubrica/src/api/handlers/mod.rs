pub(crate) mod generate;
pub(crate) mod health;
pub(crate) mod notify;

pub use generate::{generate, PROMPT_REQUIRED_MESSAGE};
pub use health::health_check;
pub use notify::{notify, NotifyResponse};

use axum::http::StatusCode;
use serde::Serialize;

use crate::error::RubricaError;

/// Error envelope shared by every endpoint: `{"error": {"message": "..."}}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: ErrorMessage,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorMessage {
    pub message: String,
}

/// Bare `OPTIONS`: 200 with an empty body. Real CORS preflights are answered
/// by the CORS layer before reaching the router.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> RubricaError {
    RubricaError::MethodNotAllowed("Method not allowed".to_string())
}
