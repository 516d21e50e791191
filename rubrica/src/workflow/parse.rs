use tracing::warn;

use crate::error::{Result, RubricaError};
use crate::models::Rubric;

pub const PARSE_FAILURE_MESSAGE: &str = "ルーブリックデータの解析に失敗しました";

/// Greedy brace match: everything from the first `{` to the last `}`.
///
/// Models often wrap JSON in prose or code fences; this strips both.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse an LLM reply into a [`Rubric`].
pub fn parse_rubric(text: &str) -> Result<Rubric> {
    let json = extract_json_object(text).ok_or_else(|| {
        warn!(reply_len = text.len(), "LLM reply contained no JSON object");
        RubricaError::Parse(PARSE_FAILURE_MESSAGE.to_string())
    })?;

    serde_json::from_str(json).map_err(|e| {
        warn!(
            reply_preview = %json.chars().take(100).collect::<String>(),
            error = %e,
            "Failed to parse rubric JSON"
        );
        RubricaError::Parse(PARSE_FAILURE_MESSAGE.to_string())
    })
}
