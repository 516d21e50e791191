use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::RubricaError;

/// `Json` extractor whose rejections use the `{error: {message}}` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RubricaError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for RubricaError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> RubricaError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            RubricaError::Validation(format!("Invalid JSON: {}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            RubricaError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => RubricaError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(_) => {
            RubricaError::Internal("Failed to read request body".to_string())
        }
        _ => RubricaError::Validation(rejection.body_text()),
    }
}
