//! 单元测试用的脚本化模型与搜索服务

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{ResearchError, ResearchResult};
use crate::generator::context::GeneratorContext;
use crate::generator::state::{ResearchState, SearchHit};
use crate::llm::{LanguageModel, ModelTier};
use crate::search::SearchEngine;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tier: ModelTier,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// 按顺序返回预设的响应，响应耗尽后返回 ModelCall 错误
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ResearchResult<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ResearchResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(
        &self,
        tier: ModelTier,
        system_prompt: &str,
        user_prompt: &str,
    ) -> ResearchResult<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            tier,
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ResearchError::model_call("no scripted response left")))
    }
}

/// 按查询返回预设结果；未登记的查询返回空结果，登记为失败的查询返回 SearchCall 错误
#[derive(Default)]
pub struct ScriptedSearch {
    results: HashMap<String, Vec<SearchHit>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn builder() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.to_string(), hits);
        self
    }

    pub fn with_failure(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchEngine for ScriptedSearch {
    async fn search(&self, query: &str, max_results: usize) -> ResearchResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.failing.contains(query) {
            return Err(ResearchError::search_call(format!("search failed for {}", query)));
        }
        let mut hits = self.results.get(query).cloned().unwrap_or_default();
        hits.truncate(max_results);
        Ok(hits)
    }
}

pub fn test_context(model: Arc<ScriptedModel>, search: Arc<ScriptedSearch>) -> GeneratorContext {
    GeneratorContext::with_services(Config::default(), model, search)
}

/// 已完成子问题拆解、处于 Researching 阶段的状态
pub fn researching_state(query: &str, questions: &[&str]) -> ResearchState {
    let mut state = ResearchState::new(query).unwrap();
    state
        .set_sub_questions(questions.iter().map(|q| q.to_string()).collect())
        .unwrap();
    state
}
