//! Coordination阶段：把原始问题拆解为可独立检索的子问题

use tracing::{info, warn};

use crate::generator::context::GeneratorContext;
use crate::generator::state::{PipelinePhase, ResearchState};
use crate::generator::types::{PipelineFailure, Stage, StageResult};
use crate::llm::ModelTier;

pub mod parser;

pub use parser::parse_sub_questions;

const SYSTEM_PROMPT: &str = "You are a research coordinator. Your job is to break a complex research question into discrete sub-questions that can each be answered by an independent web search.";

/// 子问题拆解器
#[derive(Default)]
pub struct Coordinator;

impl Coordinator {
    fn build_user_prompt(query: &str, max_sub_questions: usize) -> String {
        let count = if max_sub_questions >= 3 {
            format!("between 3 and {}", max_sub_questions)
        } else {
            format!("at most {}", max_sub_questions)
        };
        format!(
            "Research question:\n{}\n\nDecompose the question into {} specific, self-contained sub-questions. \
Each sub-question must be answerable on its own by a web search and together they must cover the research question. \
Return ONLY a numbered list with one sub-question per line (for example `1. ...`), without any introduction, headings or commentary.",
            query, count
        )
    }
}

impl Stage for Coordinator {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Coordinating
    }

    async fn execute(&self, context: &GeneratorContext, mut state: ResearchState) -> StageResult {
        let max_sub_questions = context.config.pipeline.max_sub_questions;
        let system_prompt = context.localized_system_prompt(SYSTEM_PROMPT);
        let user_prompt = Self::build_user_prompt(state.original_query(), max_sub_questions);

        let response = match context
            .llm
            .complete(ModelTier::Efficient, &system_prompt, &user_prompt)
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(PipelineFailure::new(state, e)),
        };

        let mut sub_questions = parse_sub_questions(&response);
        if sub_questions.len() > max_sub_questions {
            info!(
                parsed = sub_questions.len(),
                limit = max_sub_questions,
                "子问题数量超过上限，已截断"
            );
            sub_questions.truncate(max_sub_questions);
        }

        if sub_questions.is_empty() {
            warn!("模型未返回可解析的子问题，将仅基于原始问题作答");
            state.push_diagnostic("Coordination: 模型未返回可解析的子问题，仅基于原始问题作答");
        }

        if let Err(e) = state.set_sub_questions(sub_questions) {
            return Err(PipelineFailure::new(state, e));
        }

        info!(
            count = state.sub_questions().map_or(0, <[String]>::len),
            "子问题拆解完成"
        );
        Ok(state)
    }
}
