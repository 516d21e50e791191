use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{BasicInfo, Rubric};

/// Usage event posted to `/api/notify`.
///
/// Every field is optional and accepts any JSON scalar; absent values render
/// as empty strings. Clients are free to send `levels` as `5` or `"5"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rubric_title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grade: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub levels: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub criteria_count: String,
    /// Aspect names; arrays are joined with `,`.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub aspects: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    RubricGenerated,
    FirstUse,
}

pub const RUBRIC_GENERATED: &str = "rubric_generated";
pub const FIRST_USE: &str = "first_use";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Local wall-clock time in the format shown in chat messages.
pub fn local_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Who is using the app, as entered on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    pub school: String,
    pub name: String,
    pub email: String,
}

impl NotificationEvent {
    pub fn first_use(profile: &UserProfile, timestamp: impl Into<String>) -> Self {
        Self {
            kind: Some(FIRST_USE.to_string()),
            school: profile.school.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            timestamp: timestamp.into(),
            ..Self::default()
        }
    }

    pub fn rubric_generated(
        profile: &UserProfile,
        info: &BasicInfo,
        rubric: &Rubric,
        timestamp: impl Into<String>,
    ) -> Self {
        let aspects = rubric
            .criteria
            .iter()
            .map(|c| c.aspect.as_str())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            kind: Some(RUBRIC_GENERATED.to_string()),
            school: profile.school.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            timestamp: timestamp.into(),
            rubric_title: info.title.clone(),
            subject: info.subject.clone(),
            grade: info.grade.clone(),
            levels: info.levels.to_string(),
            criteria_count: rubric.criteria.len().to_string(),
            aspects: Some(aspects),
        }
    }

    /// Anything other than `rubric_generated` is treated as a first-use event.
    pub fn event_kind(&self) -> EventKind {
        match self.kind.as_deref() {
            Some(RUBRIC_GENERATED) => EventKind::RubricGenerated,
            _ => EventKind::FirstUse,
        }
    }

    /// Render the chat message for this event.
    pub fn message(&self) -> String {
        match self.event_kind() {
            EventKind::RubricGenerated => {
                let aspects = self
                    .aspects
                    .as_deref()
                    .filter(|a| !a.is_empty())
                    .unwrap_or("不明");
                format!(
                    "✅ ルーブリック生成完了\n\
                     時刻: {}\n\
                     学校名: {}\n\
                     名前: {}\n\
                     ルーブリック名: {}\n\
                     科目: {}\n\
                     学年: {}\n\
                     評価段階: {}段階\n\
                     評価観点数: {}個\n\
                     評価観点: {}",
                    self.timestamp,
                    self.school,
                    self.name,
                    self.rubric_title,
                    self.subject,
                    self.grade,
                    self.levels,
                    self.criteria_count,
                    aspects
                )
            }
            EventKind::FirstUse => format!(
                "📝 ルーブリック作成アプリ利用開始\n\
                 時刻: {}\n\
                 学校名: {}\n\
                 名前: {}\n\
                 メール: {}",
                self.timestamp, self.school, self.name, self.email
            ),
        }
    }
}

fn render_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(render_value(Value::deserialize(deserializer)?))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        other => Ok(Some(render_value(other))),
    }
}
