//! Prompt templates for rubric generation and revision
//!
//! These templates use basic `format!()` interpolation for type safety.
//! Every template asks the model to answer with the same JSON shape so the
//! reply can be parsed by [`crate::workflow::parse_rubric`].

use crate::models::{BasicInfo, Criterion, Rubric};

/// Which way a difficulty adjustment moves every level description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Easier,
    Harder,
}

/// Generate the initial rubric-generation prompt
///
/// The user's standard for each criterion is anchored to the middle level
/// (`ceil(levels / 2)`), and the model is asked for one description per level
/// from the highest level down to 1.
///
/// # Arguments
/// * `info` - Subject, title, grade, level count and character budget
/// * `criteria` - The aspects with their middle-level standards
///
/// # Example
/// ```
/// use rubrica::llm::prompts::generation_prompt;
/// use rubrica::models::{BasicInfo, Criterion};
///
/// let info = BasicInfo {
///     subject: "理科".to_string(),
///     title: "レポート評価".to_string(),
///     grade: "中2".to_string(),
///     ..BasicInfo::default()
/// };
/// let criteria = vec![Criterion {
///     id: 1,
///     aspect: "思考力".to_string(),
///     standard: "論理的に分析できる".to_string(),
/// }];
/// let prompt = generation_prompt(&info, &criteria);
/// assert!(prompt.contains("レベル3相当"));
/// ```
pub fn generation_prompt(info: &BasicInfo, criteria: &[Criterion]) -> String {
    let levels = info.levels.get();
    let middle = info.levels.middle();
    let next = levels - 1;
    let char_count = info.char_count;
    let title = &info.title;
    let subject = &info.subject;
    let grade = &info.grade;

    let criteria_list = criteria
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. 観点「{}」- {}", i + 1, c.aspect, c.standard))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"以下の情報をもとに、{levels}段階の詳細なルーブリックを作成してください。

評価項目: {title}
科目: {subject}
学年: {grade}

評価観点と評価規準:
{criteria_list}

重要: 上記の評価規準は、評価の中央レベル（{levels}段階の場合、レベル{middle}相当）を想定した内容です。

各観点について、レベル{levels}（最高）からレベル1（最低）までの具体的な評価規準を作成してください。
中央レベルの規準を基準として、上位レベルはより高度に、下位レベルはより基礎的な内容にしてください。
各レベルの説明は約{char_count}文字程度で記述してください。
各レベルには、生徒の具体的な行動や成果物の特徴を明確に記述してください。

JSON形式で以下のように出力してください:
{{
  "criteria": [
    {{
      "aspect": "観点名",
      "levels": [
        {{ "level": {levels}, "description": "最高レベルの基準" }},
        {{ "level": {next}, "description": "..." }},
        ...
      ]
    }}
  ]
}}"#
    )
}

/// Generate a prompt that shifts every level of an existing rubric
///
/// The full current rubric is re-sent as pretty-printed JSON. Harder raises
/// the bar in each description, easier lowers it; wording stays plain and the
/// character budget is restated.
///
/// # Example
/// ```
/// use rubrica::llm::prompts::{adjustment_prompt, Direction};
/// use rubrica::models::{BasicInfo, Rubric};
///
/// let rubric = Rubric { criteria: vec![] };
/// let prompt = adjustment_prompt(&BasicInfo::default(), &rubric, Direction::Harder);
/// assert!(prompt.contains("【難しく調整】"));
/// ```
pub fn adjustment_prompt(info: &BasicInfo, rubric: &Rubric, direction: Direction) -> String {
    let rubric_json = rubric_json(rubric);
    let char_count = info.char_count;
    let title = &info.title;
    let subject = &info.subject;
    let grade = &info.grade;

    let instruction = match direction {
        Direction::Harder => {
            "【難しく調整】各評価レベルで求められる達成度を高くしてください。より優れた成果や深い理解を要求する内容にしてください。例えば、元々「複数の視点から考察できる」だった場合は「多様な視点から深く考察し、独自の結論を導ける」のように、求める水準を引き上げてください。用語や表現は平易なまま、達成すべきレベルを上げてください。"
        }
        Direction::Easier => {
            "【易しく調整】各評価レベルで求められる達成度を低くしてください。より基礎的な成果でも評価されるようにしてください。例えば、元々「複数の視点から考察できる」だった場合は「基本的な視点から考察できる」のように、求める水準を引き下げてください。用語や表現は平易なまま、達成しやすい内容にしてください。"
        }
    };

    format!(
        r#"以下のルーブリックの評価レベルの難易度を調整してください。

現在のルーブリック:
{rubric_json}

評価項目: {title}
科目: {subject}
学年: {grade}

{instruction}

各レベルの説明は約{char_count}文字程度で記述してください。
同じJSON形式で出力してください。"#
    )
}

/// Generate a prompt that applies the user's free-text instruction verbatim
///
/// # Example
/// ```
/// use rubrica::llm::prompts::custom_instruction_prompt;
/// use rubrica::models::{BasicInfo, Rubric};
///
/// let rubric = Rubric { criteria: vec![] };
/// let prompt = custom_instruction_prompt(&BasicInfo::default(), &rubric, "もっと具体的に");
/// assert!(prompt.contains("もっと具体的に"));
/// ```
pub fn custom_instruction_prompt(info: &BasicInfo, rubric: &Rubric, instruction: &str) -> String {
    let rubric_json = rubric_json(rubric);
    let char_count = info.char_count;
    let title = &info.title;
    let subject = &info.subject;
    let grade = &info.grade;

    format!(
        r#"以下のルーブリックを、ユーザーの指示に従って修正してください。

現在のルーブリック:
{rubric_json}

評価項目: {title}
科目: {subject}
学年: {grade}

ユーザーの修正指示:
{instruction}

上記の指示に従ってルーブリックを修正してください。
各レベルの説明は約{char_count}文字程度で記述してください。
同じJSON形式で出力してください。"#
    )
}

fn rubric_json(rubric: &Rubric) -> String {
    // Serializing plain strings and integers cannot fail.
    serde_json::to_string_pretty(rubric).unwrap_or_default()
}
