//! 网络搜索服务抽象
//!
//! Research阶段通过 [`SearchEngine`] 为每个子问题发起一次检索，
//! 生产环境使用 [`TavilyClient`]。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ResearchResult;

pub mod tavily;

pub use tavily::TavilyClient;

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// 页面标题
    pub title: String,
    /// 页面地址
    pub url: String,
    /// 正文摘录
    pub excerpt: String,
    /// 搜索服务给出的相关性评分（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            excerpt: excerpt.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// 网络搜索服务
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// 返回按相关性排序的结果，最多 `max_results` 条。
    /// 传输或解析失败以 `ResearchError::SearchCall` 返回
    async fn search(&self, query: &str, max_results: usize) -> ResearchResult<Vec<SearchHit>>;
}
