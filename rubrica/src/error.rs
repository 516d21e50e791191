use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RubricaError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    MissingCredential(String),

    /// Non-2xx reply from an upstream service; the status is relayed verbatim.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RubricaError {
    pub fn status(&self) -> StatusCode {
        match self {
            RubricaError::Validation(_) => StatusCode::BAD_REQUEST,
            RubricaError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RubricaError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RubricaError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RubricaError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RubricaError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RubricaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RubricaError::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RubricaError::Parse(_) => StatusCode::BAD_GATEWAY,
            RubricaError::InvalidState(_) => StatusCode::CONFLICT,
            RubricaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RubricaError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RubricaError>;
