use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Number of performance levels in a rubric. Only 3, 4 and 5 are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum LevelCount {
    Three,
    Four,
    #[default]
    Five,
}

impl LevelCount {
    pub const ALL: [LevelCount; 3] = [LevelCount::Three, LevelCount::Four, LevelCount::Five];

    pub fn get(self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// The level the user-supplied standard is anchored to: `ceil(levels / 2)`.
    pub fn middle(self) -> u8 {
        self.get().div_ceil(2)
    }
}

impl TryFrom<u8> for LevelCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(format!("Unsupported level count: {other} (expected 3, 4 or 5)")),
        }
    }
}

impl From<LevelCount> for u8 {
    fn from(value: LevelCount) -> Self {
        value.get()
    }
}

impl fmt::Display for LevelCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl std::str::FromStr for LevelCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("Unsupported level count: {s}"))?;
        Self::try_from(value)
    }
}

/// Approximate character budget per level description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum CharCount {
    Short,
    #[default]
    Standard,
    Detailed,
    Long,
}

impl CharCount {
    pub const ALL: [CharCount; 4] = [
        CharCount::Short,
        CharCount::Standard,
        CharCount::Detailed,
        CharCount::Long,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "30",
            Self::Standard => "50",
            Self::Detailed => "80",
            Self::Long => "120",
        }
    }

    /// Human-readable option label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "短め（約30文字）",
            Self::Standard => "標準（約50文字）",
            Self::Detailed => "詳細（約80文字）",
            Self::Long => "長め（約120文字）",
        }
    }
}

impl TryFrom<String> for CharCount {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CharCount> for String {
    fn from(value: CharCount) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CharCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CharCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "30" => Ok(Self::Short),
            "50" => Ok(Self::Standard),
            "80" => Ok(Self::Detailed),
            "120" => Ok(Self::Long),
            other => Err(format!("Unsupported character count: {other}")),
        }
    }
}

/// Step-one form data: what is being assessed and how the rubric is shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[validate(length(min = 1, message = "科目を入力してください"))]
    pub subject: String,
    #[validate(length(min = 1, message = "ルーブリック名を入力してください"))]
    pub title: String,
    #[validate(length(min = 1, message = "学年を入力してください"))]
    pub grade: String,
    pub levels: LevelCount,
    pub char_count: CharCount,
}

impl BasicInfo {
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

pub type CriterionId = u64;

/// One evaluation aspect with its middle-level standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub aspect: String,
    pub standard: String,
}

impl Criterion {
    pub fn blank(id: CriterionId) -> Self {
        Self {
            id,
            aspect: String::new(),
            standard: String::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.aspect.trim().is_empty() && !self.standard.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionField {
    Aspect,
    Standard,
}

/// The criteria × levels grid produced by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    pub criteria: Vec<RubricCriterion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub aspect: String,
    pub levels: Vec<RubricLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricLevel {
    pub level: u8,
    pub description: String,
}

impl Rubric {
    /// Whether every criterion lists exactly `levels` entries numbered from
    /// `levels` down to 1.
    pub fn conforms_to(&self, levels: LevelCount) -> bool {
        let expected: Vec<u8> = (1..=levels.get()).rev().collect();
        self.criteria.iter().all(|criterion| {
            criterion
                .levels
                .iter()
                .map(|l| l.level)
                .eq(expected.iter().copied())
        })
    }
}
