use tracing::{error, info, warn};
use validator::Validate;

use crate::error::{Result, RubricaError};
use crate::llm::prompts::{
    adjustment_prompt, custom_instruction_prompt, generation_prompt, Direction,
};
use crate::models::{
    BasicInfo, Criterion, CriterionField, CriterionId, GeneratedContent, GenerationRequest, Rubric,
};

use super::export::RubricExport;
use super::parse::parse_rubric;
use super::RubricGenerator;

/// Token budget the workflow asks the proxy for on every call.
pub const CLIENT_MAX_TOKENS: u32 = 5000;

const INCOMPLETE_CRITERIA_MESSAGE: &str = "すべての観点名と評価規準を入力してください";
const EMPTY_INSTRUCTION_MESSAGE: &str = "修正指示を入力してください";
const GENERATION_IN_PROGRESS_MESSAGE: &str = "生成中です。完了までお待ちください";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    BasicInfoEntry,
    CriteriaEntry,
    RubricReview,
}

/// What the in-flight request will do to the rubric once it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Initial,
    Adjust(Direction),
    Custom,
}

/// Owner of all wizard state.
///
/// At most one generation may be in flight; every mutating operation is
/// refused while one is pending. The rubric is only ever replaced whole.
#[derive(Debug, Clone)]
pub struct Workflow {
    step: Step,
    basic_info: BasicInfo,
    criteria: Vec<Criterion>,
    next_criterion_id: CriterionId,
    rubric: Option<Rubric>,
    custom_instruction: String,
    in_flight: Option<GenerationKind>,
    error: Option<String>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            step: Step::BasicInfoEntry,
            basic_info: BasicInfo::default(),
            criteria: vec![Criterion::blank(1)],
            next_criterion_id: 2,
            rubric: None,
            custom_instruction: String::new(),
            in_flight: None,
            error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn basic_info(&self) -> &BasicInfo {
        &self.basic_info
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn rubric(&self) -> Option<&Rubric> {
        self.rubric.as_ref()
    }

    pub fn custom_instruction(&self) -> &str {
        &self.custom_instruction
    }

    /// The error banner, if the last action failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<GenerationKind> {
        self.in_flight
    }

    fn require(&self, step: Step) -> Result<()> {
        if self.in_flight.is_some() {
            return Err(RubricaError::InvalidState(
                GENERATION_IN_PROGRESS_MESSAGE.to_string(),
            ));
        }
        if self.step != step {
            return Err(RubricaError::InvalidState(format!(
                "Operation not available in {:?} (requires {:?})",
                self.step, step
            )));
        }
        Ok(())
    }

    fn require_idle(&self) -> Result<()> {
        if self.in_flight.is_some() {
            return Err(RubricaError::InvalidState(
                GENERATION_IN_PROGRESS_MESSAGE.to_string(),
            ));
        }
        Ok(())
    }

    // Step 1: basic info

    pub fn edit_basic_info(&mut self) -> Result<&mut BasicInfo> {
        self.require(Step::BasicInfoEntry)?;
        Ok(&mut self.basic_info)
    }

    pub fn proceed_to_criteria(&mut self) -> Result<()> {
        self.require(Step::BasicInfoEntry)?;
        if let Err(errors) = self.basic_info.validate() {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "基本情報を入力してください".to_string());
            return Err(RubricaError::Validation(message));
        }

        self.step = Step::CriteriaEntry;
        Ok(())
    }

    // Step 2: criteria

    pub fn add_criterion(&mut self) -> Result<CriterionId> {
        self.require(Step::CriteriaEntry)?;
        let id = self.next_criterion_id;
        self.next_criterion_id += 1;
        self.criteria.push(Criterion::blank(id));
        Ok(id)
    }

    /// Remove a criterion. The last remaining criterion is never removed;
    /// returns whether anything was removed.
    pub fn remove_criterion(&mut self, id: CriterionId) -> Result<bool> {
        self.require(Step::CriteriaEntry)?;
        if self.criteria.len() <= 1 {
            return Ok(false);
        }
        let before = self.criteria.len();
        self.criteria.retain(|c| c.id != id);
        Ok(self.criteria.len() != before)
    }

    pub fn update_criterion(
        &mut self,
        id: CriterionId,
        field: CriterionField,
        value: impl Into<String>,
    ) -> Result<()> {
        self.require(Step::CriteriaEntry)?;
        let criterion = self
            .criteria
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RubricaError::Validation(format!("Unknown criterion: {id}")))?;

        match field {
            CriterionField::Aspect => criterion.aspect = value.into(),
            CriterionField::Standard => criterion.standard = value.into(),
        }
        Ok(())
    }

    // Generation

    /// Validate the criteria and enter `Generating` with the initial prompt.
    pub fn begin_generation(&mut self) -> Result<GenerationRequest> {
        self.require(Step::CriteriaEntry)?;
        if !self.criteria.iter().all(Criterion::is_complete) {
            self.error = Some(INCOMPLETE_CRITERIA_MESSAGE.to_string());
            return Err(RubricaError::Validation(
                INCOMPLETE_CRITERIA_MESSAGE.to_string(),
            ));
        }

        let prompt = generation_prompt(&self.basic_info, &self.criteria);
        Ok(self.start(GenerationKind::Initial, prompt))
    }

    /// Re-send the whole rubric asking for a uniform difficulty shift.
    pub fn begin_adjustment(&mut self, direction: Direction) -> Result<GenerationRequest> {
        self.require(Step::RubricReview)?;
        let rubric = self.current_rubric()?;
        let prompt = adjustment_prompt(&self.basic_info, rubric, direction);
        Ok(self.start(GenerationKind::Adjust(direction), prompt))
    }

    pub fn set_custom_instruction(&mut self, instruction: impl Into<String>) -> Result<()> {
        self.require(Step::RubricReview)?;
        self.custom_instruction = instruction.into();
        Ok(())
    }

    /// Re-send the whole rubric with the user's instruction verbatim.
    pub fn begin_custom_edit(&mut self) -> Result<GenerationRequest> {
        self.require(Step::RubricReview)?;
        if self.custom_instruction.trim().is_empty() {
            self.error = Some(EMPTY_INSTRUCTION_MESSAGE.to_string());
            return Err(RubricaError::Validation(EMPTY_INSTRUCTION_MESSAGE.to_string()));
        }

        let rubric = self.current_rubric()?;
        let prompt = custom_instruction_prompt(&self.basic_info, rubric, &self.custom_instruction);
        Ok(self.start(GenerationKind::Custom, prompt))
    }

    fn current_rubric(&self) -> Result<&Rubric> {
        self.rubric
            .as_ref()
            .ok_or_else(|| RubricaError::InvalidState("No rubric has been generated".to_string()))
    }

    fn start(&mut self, kind: GenerationKind, prompt: String) -> GenerationRequest {
        info!(?kind, prompt_len = prompt.chars().count(), "Starting rubric generation");
        self.in_flight = Some(kind);
        self.error = None;
        GenerationRequest::new(prompt).with_max_tokens(CLIENT_MAX_TOKENS)
    }

    /// Leave `Generating` with the outcome of the request.
    ///
    /// On success the rubric is replaced; on any failure the previous rubric
    /// and step are kept and the error banner is set.
    pub fn complete_generation(&mut self, reply: Result<GeneratedContent>) -> Result<&Rubric> {
        let kind = self.in_flight.take().ok_or_else(|| {
            RubricaError::InvalidState("No generation is in progress".to_string())
        })?;

        let rubric = match reply.and_then(|content| parse_rubric(content.text())) {
            Ok(rubric) => rubric,
            Err(e) => {
                error!(?kind, error = %e, "Rubric generation failed");
                self.error = Some(format!("エラー: {e}"));
                return Err(e);
            }
        };

        if !rubric.conforms_to(self.basic_info.levels) {
            warn!(
                levels = self.basic_info.levels.get(),
                "Generated rubric does not list every level from highest to 1"
            );
        }

        match kind {
            GenerationKind::Initial => self.step = Step::RubricReview,
            GenerationKind::Custom => self.custom_instruction.clear(),
            GenerationKind::Adjust(_) => {}
        }
        self.error = None;

        Ok(self.rubric.insert(rubric))
    }

    /// Drop the pending request without touching the rubric.
    pub fn abort_generation(&mut self) -> bool {
        self.in_flight.take().is_some()
    }

    pub async fn generate_with(&mut self, generator: &dyn RubricGenerator) -> Result<&Rubric> {
        let request = self.begin_generation()?;
        let reply = generator.generate(&request).await;
        self.complete_generation(reply)
    }

    pub async fn adjust_with(
        &mut self,
        direction: Direction,
        generator: &dyn RubricGenerator,
    ) -> Result<&Rubric> {
        let request = self.begin_adjustment(direction)?;
        let reply = generator.generate(&request).await;
        self.complete_generation(reply)
    }

    pub async fn apply_custom_instruction_with(
        &mut self,
        generator: &dyn RubricGenerator,
    ) -> Result<&Rubric> {
        let request = self.begin_custom_edit()?;
        let reply = generator.generate(&request).await;
        self.complete_generation(reply)
    }

    // Navigation

    /// Back to criteria editing; the current rubric is discarded.
    pub fn back_to_edit(&mut self) -> Result<()> {
        self.require(Step::RubricReview)?;
        self.rubric = None;
        self.error = None;
        self.step = Step::CriteriaEntry;
        Ok(())
    }

    /// Back to step one keeping basic info and criteria; the rubric is discarded.
    pub fn home(&mut self) -> Result<()> {
        self.require_idle()?;
        self.rubric = None;
        self.error = None;
        self.step = Step::BasicInfoEntry;
        Ok(())
    }

    /// Full reset to a blank workflow.
    pub fn start_new(&mut self) -> Result<()> {
        self.require_idle()?;
        *self = Self::new();
        Ok(())
    }

    pub fn export(&self) -> Result<RubricExport> {
        let rubric = self.current_rubric()?;
        Ok(RubricExport::new(&self.basic_info, rubric))
    }
}
