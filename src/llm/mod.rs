//! 大模型服务抽象
//!
//! 各阶段只依赖 [`LanguageModel`]，生产环境由基于rig的 [`client::LLMClient`] 实现，
//! 测试中可替换为脚本化的实现。

use async_trait::async_trait;

use crate::error::ResearchResult;

pub mod client;

pub use client::LLMClient;

/// 模型档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    /// 高能效模型，适合结构简单的任务（子问题拆解）
    Efficient,
    /// 高质量模型，适合长上下文推理（综合、润色）
    Powerful,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Efficient => write!(f, "efficient"),
            ModelTier::Powerful => write!(f, "powerful"),
        }
    }
}

/// 文本补全服务：输入系统提示词与用户提示词，返回生成文本
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 单轮补全。传输失败、配额不足、超时都以 `ResearchError::ModelCall` 返回
    async fn complete(
        &self,
        tier: ModelTier,
        system_prompt: &str,
        user_prompt: &str,
    ) -> ResearchResult<String>;
}
