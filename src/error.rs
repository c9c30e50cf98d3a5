use thiserror::Error;

/// 调研流水线中可能出现的错误
#[derive(Debug, Error)]
pub enum ResearchError {
    /// 启动阶段的配置错误（凭据缺失、参数非法），属于致命错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 大模型调用失败或返回了无法解析的内容，中止当前调研
    #[error("模型调用失败: {0}")]
    ModelCall(String),

    /// 单个子问题的搜索请求失败，在Research阶段内被降级为空结果
    #[error("搜索调用失败: {0}")]
    SearchCall(String),

    /// 阶段写入顺序被破坏（重复写入或前置字段缺失）
    #[error("状态错误: {0}")]
    State(String),
}

impl ResearchError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn model_call(msg: impl Into<String>) -> Self {
        Self::ModelCall(msg.into())
    }

    pub fn search_call(msg: impl Into<String>) -> Self {
        Self::SearchCall(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn is_model_call(&self) -> bool {
        matches!(self, Self::ModelCall(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type ResearchResult<T> = std::result::Result<T, ResearchError>;
