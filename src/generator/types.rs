use thiserror::Error;

use crate::error::ResearchError;
use crate::generator::context::GeneratorContext;
use crate::generator::state::{PipelinePhase, ResearchState};

/// 一次失败的调研：记录失败阶段，并交还已部分填充的状态
#[derive(Debug, Error)]
#[error("调研在 {failed_at} 阶段失败: {error}")]
pub struct PipelineFailure {
    pub failed_at: PipelinePhase,
    #[source]
    pub error: ResearchError,
    pub state: Box<ResearchState>,
}

impl PipelineFailure {
    /// 以状态当前所处阶段作为失败阶段，并把状态标记为 Failed
    pub fn new(mut state: ResearchState, error: ResearchError) -> Self {
        let failed_at = state.phase();
        state.mark_failed();
        Self {
            failed_at,
            error,
            state: Box::new(state),
        }
    }
}

pub type StageResult = Result<ResearchState, PipelineFailure>;

/// 流水线中的一个阶段：接管状态所有权，写入自己负责的字段后交还
#[allow(async_fn_in_trait)]
pub trait Stage {
    /// 阶段开始执行时状态应处的阶段
    fn phase(&self) -> PipelinePhase;

    async fn execute(&self, context: &GeneratorContext, state: ResearchState) -> StageResult;
}
