//! Learning-plan chain — two strictly sequential render → model → parse stages.
//!
//! Flow: RequestKey → skill-gap-analysis prompt → model → GapAnalysis →
//!       30-day-plan prompt → model → LearningPlan.
//!
//! Parsing is the identity: each completion is taken as opaque text. A failure in
//! either stage aborts the chain; the stage 1 text never escapes on its own.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::{CompletionModel, LlmError};
use crate::planner::prompts::{
    LEARNING_PLAN_PROMPT_TEMPLATE, LEARNING_PLAN_TEMPLATE_NAME, SKILL_GAP_PROMPT_TEMPLATE,
    SKILL_GAP_TEMPLATE_NAME,
};
use crate::planner::skills::RequestKey;
use crate::planner::template::{PromptTemplate, TemplateError};

/// Stage 1 output: skill gap analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapAnalysis(String);

impl GapAnalysis {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stage 2 output: the final 30-day learning plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LearningPlan(String);

impl LearningPlan {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStage {
    GapAnalysis,
    LearningPlan,
}

impl ChainStage {
    /// 1-based stage number reported to callers.
    pub fn index(self) -> u8 {
        match self {
            ChainStage::GapAnalysis => 1,
            ChainStage::LearningPlan => 2,
        }
    }
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStage::GapAnalysis => write!(f, "1 (skill-gap-analysis)"),
            ChainStage::LearningPlan => write!(f, "2 (30-day-plan)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Model(#[from] LlmError),
}

#[derive(Debug, Error)]
#[error("stage {stage} failed: {source}")]
pub struct ChainError {
    pub stage: ChainStage,
    #[source]
    pub source: StageFailure,
}

impl ChainError {
    fn at(stage: ChainStage) -> impl FnOnce(StageFailure) -> ChainError {
        move |source| ChainError { stage, source }
    }
}

/// The two parsed templates plus the model they are sent to.
#[derive(Debug, Clone)]
pub struct LearningPlanChain {
    gap_template: PromptTemplate,
    plan_template: PromptTemplate,
    model: String,
}

impl LearningPlanChain {
    pub fn new(model: impl Into<String>) -> Result<Self, TemplateError> {
        let gap_template = PromptTemplate::new(SKILL_GAP_TEMPLATE_NAME, SKILL_GAP_PROMPT_TEMPLATE)?;
        let plan_template =
            PromptTemplate::new(LEARNING_PLAN_TEMPLATE_NAME, LEARNING_PLAN_PROMPT_TEMPLATE)?;

        for template in [&gap_template, &plan_template] {
            debug!(
                "Template '{}' declares {:?}",
                template.name(),
                template.input_variables().collect::<Vec<_>>()
            );
        }

        Ok(Self {
            gap_template,
            plan_template,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs both stages in order and returns the stage 2 text.
    pub async fn run(
        &self,
        llm: &dyn CompletionModel,
        key: &RequestKey,
    ) -> Result<LearningPlan, ChainError> {
        info!(
            "Running learning-plan chain: role={:?}, skills={:?}",
            key.target_role(),
            key.skills().as_slice()
        );

        let gap = self
            .analyze_gaps(llm, key)
            .await
            .map_err(ChainError::at(ChainStage::GapAnalysis))?;
        debug!("Stage 1 produced {} bytes of gap analysis", gap.as_str().len());

        let plan = self
            .build_plan(llm, &gap)
            .await
            .map_err(ChainError::at(ChainStage::LearningPlan))?;
        info!("Learning plan generated ({} bytes)", plan.as_str().len());

        Ok(plan)
    }

    async fn analyze_gaps(
        &self,
        llm: &dyn CompletionModel,
        key: &RequestKey,
    ) -> Result<GapAnalysis, StageFailure> {
        let skills = key.skills().to_prompt_value();
        let vars = HashMap::from([
            ("target_role", key.target_role()),
            ("skills", skills.as_str()),
        ]);
        let prompt = self.gap_template.render(&vars)?;
        let text = complete_non_empty(llm, &self.model, &prompt).await?;
        Ok(GapAnalysis(text))
    }

    async fn build_plan(
        &self,
        llm: &dyn CompletionModel,
        gap: &GapAnalysis,
    ) -> Result<LearningPlan, StageFailure> {
        let vars = HashMap::from([("gap_analysis", gap.as_str())]);
        let prompt = self.plan_template.render(&vars)?;
        let text = complete_non_empty(llm, &self.model, &prompt).await?;
        Ok(LearningPlan(text))
    }
}

/// Blank completions count as a failed call so they are never cached as a plan.
async fn complete_non_empty(
    llm: &dyn CompletionModel,
    model: &str,
    prompt: &str,
) -> Result<String, LlmError> {
    let text = llm.complete(model, prompt).await?;
    if text.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text)
}
