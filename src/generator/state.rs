//! 调研状态：在四个阶段之间按所有权传递的记录
//!
//! 每个字段只由拥有它的阶段写入一次，setter 会拒绝重复写入和越级写入。

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use uuid::Uuid;

use crate::error::{ResearchError, ResearchResult};
pub use crate::search::SearchHit;

/// 流水线所处阶段，只能向前推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelinePhase {
    Coordinating,
    Researching,
    Synthesizing,
    Finalizing,
    Done,
    Failed,
}

impl Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            PipelinePhase::Coordinating => "Coordinating",
            PipelinePhase::Researching => "Researching",
            PipelinePhase::Synthesizing => "Synthesizing",
            PipelinePhase::Finalizing => "Finalizing",
            PipelinePhase::Done => "Done",
            PipelinePhase::Failed => "Failed",
        };
        write!(f, "{}", str)
    }
}

/// 调研统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub sub_questions: usize,
    pub sources: usize,
    pub diagnostics: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchState {
    run_id: Uuid,
    original_query: String,
    sub_questions: Option<Vec<String>>,
    search_results: Option<HashMap<String, Vec<SearchHit>>>,
    draft_answer: Option<String>,
    final_report: Option<String>,
    diagnostics: Vec<String>,
    phase: PipelinePhase,
}

impl ResearchState {
    /// 为一次调研创建新的状态，查询不能为空
    pub fn new(original_query: impl Into<String>) -> ResearchResult<Self> {
        let original_query = original_query.into().trim().to_string();
        if original_query.is_empty() {
            return Err(ResearchError::state("调研问题不能为空"));
        }
        Ok(Self {
            run_id: Uuid::new_v4(),
            original_query,
            sub_questions: None,
            search_results: None,
            draft_answer: None,
            final_report: None,
            diagnostics: Vec::new(),
            phase: PipelinePhase::Coordinating,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn original_query(&self) -> &str {
        &self.original_query
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Coordination 完成前为 `None`；完成后可能是空列表
    pub fn sub_questions(&self) -> Option<&[String]> {
        self.sub_questions.as_deref()
    }

    pub fn search_results(&self) -> Option<&HashMap<String, Vec<SearchHit>>> {
        self.search_results.as_ref()
    }

    /// 某个子问题的搜索结果
    pub fn results_for(&self, sub_question: &str) -> Option<&[SearchHit]> {
        self.search_results
            .as_ref()
            .and_then(|results| results.get(sub_question))
            .map(Vec::as_slice)
    }

    pub fn draft_answer(&self) -> Option<&str> {
        self.draft_answer.as_deref()
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    /// 运行过程中记录的可恢复问题（搜索失败、润色降级等）
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// 按子问题顺序展开的来源列表，按URL去重，保留首次出现
    pub fn sources(&self) -> Vec<&SearchHit> {
        let (Some(questions), Some(results)) = (&self.sub_questions, &self.search_results) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        questions
            .iter()
            .filter_map(|question| results.get(question))
            .flatten()
            .filter(|hit| seen.insert(hit.url.as_str()))
            .collect()
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            sub_questions: self.sub_questions.as_ref().map_or(0, Vec::len),
            sources: self.sources().len(),
            diagnostics: self.diagnostics.len(),
        }
    }

    /// 取出最终报告，仅在 Done 状态下可用
    pub fn into_final_report(self) -> Option<String> {
        self.final_report
    }

    pub(crate) fn set_sub_questions(&mut self, sub_questions: Vec<String>) -> ResearchResult<()> {
        self.expect_phase(PipelinePhase::Coordinating, "sub_questions")?;
        if sub_questions.iter().any(|q| q.trim().is_empty()) {
            return Err(ResearchError::state("子问题不能为空白字符串"));
        }
        let unique: HashSet<&str> = sub_questions.iter().map(String::as_str).collect();
        if unique.len() != sub_questions.len() {
            return Err(ResearchError::state("子问题存在重复项"));
        }
        self.sub_questions = Some(sub_questions);
        self.phase = PipelinePhase::Researching;
        Ok(())
    }

    pub(crate) fn set_search_results(
        &mut self,
        search_results: HashMap<String, Vec<SearchHit>>,
    ) -> ResearchResult<()> {
        self.expect_phase(PipelinePhase::Researching, "search_results")?;
        let questions = self
            .sub_questions
            .as_ref()
            .ok_or_else(|| ResearchError::state("写入搜索结果前必须先完成子问题拆解"))?;

        let keys_match = search_results.len() == questions.len()
            && questions.iter().all(|q| search_results.contains_key(q));
        if !keys_match {
            return Err(ResearchError::state(
                "搜索结果的键必须与子问题完全一致",
            ));
        }

        self.search_results = Some(search_results);
        self.phase = PipelinePhase::Synthesizing;
        Ok(())
    }

    pub(crate) fn set_draft_answer(&mut self, draft_answer: String) -> ResearchResult<()> {
        self.expect_phase(PipelinePhase::Synthesizing, "draft_answer")?;
        if draft_answer.trim().is_empty() {
            return Err(ResearchError::state("草稿不能为空"));
        }
        self.draft_answer = Some(draft_answer);
        self.phase = PipelinePhase::Finalizing;
        Ok(())
    }

    pub(crate) fn set_final_report(&mut self, final_report: String) -> ResearchResult<()> {
        self.expect_phase(PipelinePhase::Finalizing, "final_report")?;
        if final_report.trim().is_empty() {
            return Err(ResearchError::state("最终报告不能为空"));
        }
        self.final_report = Some(final_report);
        self.phase = PipelinePhase::Done;
        Ok(())
    }

    pub(crate) fn push_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }

    pub(crate) fn mark_failed(&mut self) {
        self.phase = PipelinePhase::Failed;
    }

    fn expect_phase(&self, expected: PipelinePhase, field: &str) -> ResearchResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ResearchError::state(format!(
                "字段 {} 只能在 {} 阶段写入，当前阶段为 {}",
                field, expected, self.phase
            )))
        }
    }
}
