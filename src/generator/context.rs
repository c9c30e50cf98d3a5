use std::sync::Arc;

use crate::config::Config;
use crate::llm::LanguageModel;
use crate::search::SearchEngine;

#[derive(Clone)]
pub struct GeneratorContext {
    /// 大模型服务，用于拆解、综合与润色
    pub llm: Arc<dyn LanguageModel>,
    /// 网络搜索服务
    pub search: Arc<dyn SearchEngine>,
    /// 配置
    pub config: Config,
}

impl GeneratorContext {
    /// 组装上下文，生产环境传入 rig 大模型客户端与 Tavily 搜索客户端
    pub fn with_services(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchEngine>,
    ) -> Self {
        Self {
            llm,
            search,
            config,
        }
    }

    /// 在系统提示词末尾追加目标语言指令
    pub fn localized_system_prompt(&self, system_prompt: &str) -> String {
        format!(
            "{}\n\n{}",
            system_prompt,
            self.config.target_language.prompt_instruction()
        )
    }
}
