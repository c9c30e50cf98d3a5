//! Finalization阶段：把草稿润色为结构化的markdown报告

use tracing::{info, warn};

use crate::error::{ResearchError, ResearchResult};
use crate::generator::context::GeneratorContext;
use crate::generator::state::{PipelinePhase, ResearchState, SearchHit};
use crate::generator::types::{PipelineFailure, Stage, StageResult};
use crate::llm::ModelTier;

pub mod normalize;

pub use normalize::normalize_report;

const SYSTEM_PROMPT: &str = "You are an expert technical editor. You turn research drafts into polished, well-organized markdown reports without adding unsupported claims.";

/// 报告润色器
#[derive(Default)]
pub struct Finalizer;

impl Finalizer {
    fn build_user_prompt(
        query: &str,
        draft: &str,
        sources: &[SearchHit],
        sources_heading: &str,
    ) -> String {
        let source_list = if sources.is_empty() {
            "(none)".to_string()
        } else {
            sources
                .iter()
                .map(|hit| format!("- {} ({})", hit.url, hit.title))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Research question:\n{}\n\nDraft answer:\n{}\n\nCollected sources:\n{}\n\n\
Rewrite the draft into a polished markdown report. Start with exactly one top-level `#` heading, \
organize the content with `##` section headings and bullet points where they help readability, keep every citation, \
and end with a `## {}` section listing the source URLs that were used. Return only the markdown document.",
            query, draft, source_list, sources_heading
        )
    }

    async fn polish(
        &self,
        context: &GeneratorContext,
        state: &ResearchState,
        draft: &str,
        sources: &[SearchHit],
    ) -> ResearchResult<String> {
        let language = context.config.target_language;
        let system_prompt = context.localized_system_prompt(SYSTEM_PROMPT);
        let user_prompt = Self::build_user_prompt(
            state.original_query(),
            draft,
            sources,
            language.sources_heading(),
        );

        let polished = context
            .llm
            .complete(ModelTier::Powerful, &system_prompt, &user_prompt)
            .await?;
        if polished.trim().is_empty() {
            return Err(ResearchError::model_call("模型返回了空白的报告"));
        }
        normalize_report(&polished, state.original_query(), sources, language)
    }
}

impl Stage for Finalizer {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Finalizing
    }

    async fn execute(&self, context: &GeneratorContext, mut state: ResearchState) -> StageResult {
        let Some(draft) = state.draft_answer().map(str::to_string) else {
            let error = ResearchError::state("润色前必须先生成草稿");
            return Err(PipelineFailure::new(state, error));
        };
        let sources: Vec<SearchHit> = state.sources().into_iter().cloned().collect();
        let language = context.config.target_language;

        let polished = self.polish(context, &state, &draft, &sources).await;
        let report = match polished {
            Ok(report) => report,
            Err(e) if context.config.pipeline.fallback_to_draft => {
                warn!(error = %e, "报告润色失败，使用草稿作为最终报告");
                match normalize_report(&draft, state.original_query(), &sources, language) {
                    Ok(report) => {
                        state.push_diagnostic(format!(
                            "Finalization: 润色失败，已使用草稿作为最终报告: {}",
                            e
                        ));
                        report
                    }
                    Err(_) => return Err(PipelineFailure::new(state, e)),
                }
            }
            Err(e) => return Err(PipelineFailure::new(state, e)),
        };

        if let Err(e) = state.set_final_report(report) {
            return Err(PipelineFailure::new(state, e));
        }

        info!(
            report_len = state.final_report().map_or(0, str::len),
            "最终报告生成完成"
        );
        Ok(state)
    }
}
