//! Synthesis阶段：基于全部检索摘录生成引用来源的草稿

use tracing::{debug, info};

use crate::error::ResearchError;
use crate::generator::context::GeneratorContext;
use crate::generator::state::{PipelinePhase, ResearchState};
use crate::generator::types::{PipelineFailure, Stage, StageResult};
use crate::llm::ModelTier;

const SYSTEM_PROMPT: &str = "You are a meticulous research analyst. You write well-structured, evidence-based answers and cite the sources you rely on by their URL.";

/// 草稿生成器
#[derive(Default)]
pub struct Synthesizer;

/// 按字符数截断摘录，截断时追加省略号
fn truncate_excerpt(excerpt: &str, limit: usize) -> String {
    let excerpt = excerpt.trim();
    if excerpt.chars().count() <= limit {
        return excerpt.to_string();
    }
    let mut truncated: String = excerpt.chars().take(limit).collect();
    truncated.push('…');
    truncated
}

/// 构建综合提示词：原始问题 + 按子问题分组、全局编号的检索摘录
pub fn build_synthesis_prompt(state: &ResearchState, excerpt_char_limit: usize) -> String {
    let query = state.original_query();
    let questions = state.sub_questions().unwrap_or_default();

    if questions.is_empty() {
        return format!(
            "Research question:\n{}\n\nNo web research results are available for this question. \
Write the best answer you can from your own knowledge. Be explicit about uncertainty and about claims that should be verified against primary sources.",
            query
        );
    }

    let mut prompt = format!("Research question:\n{}\n\n## Research findings\n", query);
    let mut index = 0usize;
    for (position, question) in questions.iter().enumerate() {
        prompt.push_str(&format!("\n### Sub-question {}: {}\n", position + 1, question));

        let hits = state.results_for(question).unwrap_or_default();
        if hits.is_empty() {
            prompt.push_str("(no search results were found for this sub-question)\n");
            continue;
        }
        for hit in hits {
            index += 1;
            prompt.push_str(&format!(
                "[{}] {} - {}\n{}\n\n",
                index,
                hit.title,
                hit.url,
                truncate_excerpt(&hit.excerpt, excerpt_char_limit)
            ));
        }
    }

    prompt.push_str(
        "\nUsing the findings above, write a coherent and comprehensive draft answer to the research question. \
Address every sub-question, reconcile conflicting findings, and reference the supporting source URLs inline next to the claims they support. \
Where the findings do not cover a sub-question, say so instead of inventing facts.",
    );
    prompt
}

impl Stage for Synthesizer {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Synthesizing
    }

    async fn execute(&self, context: &GeneratorContext, mut state: ResearchState) -> StageResult {
        let system_prompt = context.localized_system_prompt(SYSTEM_PROMPT);
        let user_prompt =
            build_synthesis_prompt(&state, context.config.pipeline.excerpt_char_limit);
        debug!(prompt_len = user_prompt.len(), "综合提示词已构建");

        let draft = match context
            .llm
            .complete(ModelTier::Powerful, &system_prompt, &user_prompt)
            .await
        {
            Ok(draft) if !draft.trim().is_empty() => draft.trim().to_string(),
            Ok(_) => {
                let error = ResearchError::model_call("模型返回了空白的草稿");
                return Err(PipelineFailure::new(state, error));
            }
            Err(e) => return Err(PipelineFailure::new(state, e)),
        };

        if let Err(e) = state.set_draft_answer(draft) {
            return Err(PipelineFailure::new(state, e));
        }

        info!(
            draft_len = state.draft_answer().map_or(0, str::len),
            "草稿生成完成"
        );
        Ok(state)
    }
}
