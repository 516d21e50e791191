use crate::models::{BasicInfo, LevelCount, Rubric};

/// Letter labels, highest level first.
pub const LEVEL_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Label for `level` in a rubric of `levels`: the top level is `A`.
///
/// Levels outside the letter range fall back to the level number.
pub fn level_label(levels: LevelCount, level: u8) -> String {
    levels
        .get()
        .checked_sub(level)
        .and_then(|index| LEVEL_LETTERS.get(usize::from(index)))
        .map(|letter| letter.to_string())
        .unwrap_or_else(|| level.to_string())
}

/// A downloadable plain-text rendering of a rubric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricExport {
    pub file_name: String,
    pub contents: String,
}

impl RubricExport {
    pub fn new(info: &BasicInfo, rubric: &Rubric) -> Self {
        Self {
            file_name: format!("{}_{}_ルーブリック.txt", info.subject, info.title),
            contents: render_rubric(info, rubric),
        }
    }
}

pub fn render_rubric(info: &BasicInfo, rubric: &Rubric) -> String {
    let mut text = format!("{}\n", info.title);
    text.push_str(&format!("科目: {} | 学年: {}\n", info.subject, info.grade));
    text.push_str(&format!("評価段階: {}段階\n\n", info.levels));

    for criterion in &rubric.criteria {
        text.push_str(&format!("【{}】\n", criterion.aspect));
        for level in &criterion.levels {
            text.push_str(&format!(
                "{}: {}\n",
                level_label(info.levels, level.level),
                level.description
            ));
        }
        text.push('\n');
    }

    text
}
