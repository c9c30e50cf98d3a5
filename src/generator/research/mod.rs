//! Research阶段：为每个子问题执行一次网络搜索
//!
//! 单个子问题的搜索失败只会让该子问题得到空结果，并记录到诊断信息中，不会中止整个调研。

use std::collections::HashMap;
use tracing::{info, warn};

use crate::generator::context::GeneratorContext;
use crate::generator::state::{PipelinePhase, ResearchState, SearchHit};
use crate::generator::types::{PipelineFailure, Stage, StageResult};
use crate::utils::threads::do_parallel_with_limit;

#[derive(Default)]
pub struct Researcher;

impl Stage for Researcher {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Researching
    }

    async fn execute(&self, context: &GeneratorContext, mut state: ResearchState) -> StageResult {
        let questions: Vec<String> = state
            .sub_questions()
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        let max_results = context.config.search.max_results;
        let max_parallels = context.config.search.max_parallels;

        info!(count = questions.len(), max_parallels, "开始检索子问题");

        let search_futures: Vec<_> = questions
            .into_iter()
            .map(|question| {
                let search = context.search.clone();
                async move {
                    let result = search.search(&question, max_results).await;
                    (question, result)
                }
            })
            .collect();

        let outcomes = do_parallel_with_limit(search_futures, max_parallels).await;

        let mut search_results: HashMap<String, Vec<SearchHit>> = HashMap::new();
        for (question, result) in outcomes {
            let hits = match result {
                Ok(mut hits) => {
                    hits.truncate(max_results);
                    info!(sub_question = %question, count = hits.len(), "子问题检索完成");
                    hits
                }
                Err(e) => {
                    warn!(sub_question = %question, error = %e, "子问题检索失败，按空结果处理");
                    state.push_diagnostic(format!(
                        "Research: 子问题「{}」检索失败: {}",
                        question, e
                    ));
                    Vec::new()
                }
            };
            search_results.insert(question, hits);
        }

        if let Err(e) = state.set_search_results(search_results) {
            return Err(PipelineFailure::new(state, e));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::testing::{ScriptedModel, ScriptedSearch, researching_state, test_context};
    use std::sync::Arc;

    fn hits(prefix: &str, count: usize) -> Vec<SearchHit> {
        (0..count)
            .map(|i| {
                SearchHit::new(
                    format!("{} {}", prefix, i),
                    format!("https://{}.example/{}", prefix, i),
                    "excerpt",
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_results_are_keyed_by_sub_question() {
        let search = Arc::new(
            ScriptedSearch::builder()
                .with_hits("A?", hits("a", 2))
                .with_hits("B?", hits("b", 1)),
        );
        let context = test_context(ScriptedModel::new(Vec::new()), search.clone());

        let state = Researcher
            .execute(&context, researching_state("q", &["A?", "B?"]))
            .await
            .unwrap();

        assert_eq!(state.phase(), PipelinePhase::Synthesizing);
        assert_eq!(state.results_for("A?").unwrap().len(), 2);
        assert_eq!(state.results_for("B?").unwrap()[0].url, "https://b.example/0");
        assert!(state.diagnostics().is_empty());
        let mut queries = search.queries();
        queries.sort();
        assert_eq!(queries, vec!["A?", "B?"]);
    }

    #[tokio::test]
    async fn test_search_failure_becomes_empty_result() {
        let search = Arc::new(
            ScriptedSearch::builder()
                .with_hits("A?", hits("a", 1))
                .with_failure("B?"),
        );
        let context = test_context(ScriptedModel::new(Vec::new()), search);

        let state = Researcher
            .execute(&context, researching_state("q", &["A?", "B?"]))
            .await
            .unwrap();

        assert_eq!(state.results_for("A?").unwrap().len(), 1);
        assert!(state.results_for("B?").unwrap().is_empty());
        assert_eq!(state.diagnostics().len(), 1);
        assert!(state.diagnostics()[0].contains("B?"));
    }

    #[tokio::test]
    async fn test_results_are_capped_at_max_results() {
        let search = Arc::new(ScriptedSearch::builder().with_hits("A?", hits("a", 9)));
        let mut context = test_context(ScriptedModel::new(Vec::new()), search);
        context.config.search.max_results = 3;

        let state = Researcher
            .execute(&context, researching_state("q", &["A?"]))
            .await
            .unwrap();

        assert_eq!(state.results_for("A?").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_sub_questions_give_empty_map() {
        let search = ScriptedSearch::new();
        let context = test_context(ScriptedModel::new(Vec::new()), search.clone());

        let state = Researcher
            .execute(&context, researching_state("q", &[]))
            .await
            .unwrap();

        assert!(state.search_results().unwrap().is_empty());
        assert!(search.queries().is_empty());
    }
}
