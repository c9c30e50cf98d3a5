//! LLM客户端 - 基于rig的统一大模型调用入口

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LLMConfig;
use crate::error::{ResearchError, ResearchResult};
use crate::llm::{LanguageModel, ModelTier};

mod providers;

use providers::ProviderClient;

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 根据档位选择模型
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Efficient => &self.config.model_efficient,
            ModelTier::Powerful => &self.config.model_powerful,
        }
    }

    /// 检查模型连接和凭据是否可用，失败视为启动期配置错误
    pub async fn check_connection(&self) -> ResearchResult<()> {
        println!("🔄 正在检查模型连接...");
        match self
            .complete(
                ModelTier::Efficient,
                "You are a helpful assistant.",
                "Reply with the single word: ready",
            )
            .await
        {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(ResearchError::config(format!(
                    "{} 模型服务不可用: {}",
                    self.config.provider, e
                )))
            }
        }
    }

    /// 单轮对话（不使用工具），带显式超时
    pub async fn prompt_without_react(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> ResearchResult<String> {
        let agent = self
            .client
            .create_agent(model, system_prompt, &self.config)
            .map_err(|e| ResearchError::model_call(format!("创建模型 {} 失败: {}", model, e)))?;

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        match tokio::time::timeout(timeout, agent.prompt(user_prompt)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(ResearchError::model_call(format!(
                "模型 {} 返回了空内容",
                model
            ))),
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ResearchError::model_call(format!(
                "模型 {} 调用出错: {}",
                model, e
            ))),
            Err(_) => Err(ResearchError::model_call(format!(
                "模型 {} 调用超时（{}秒）",
                model, self.config.timeout_seconds
            ))),
        }
    }
}

#[async_trait]
impl LanguageModel for LLMClient {
    async fn complete(
        &self,
        tier: ModelTier,
        system_prompt: &str,
        user_prompt: &str,
    ) -> ResearchResult<String> {
        let model = self.model_for(tier).to_string();
        debug!(
            model = %model,
            system_len = system_prompt.len(),
            user_len = user_prompt.len(),
            "调用模型服务"
        );

        let started = std::time::Instant::now();
        let result = self
            .prompt_without_react(&model, system_prompt, user_prompt)
            .await;

        match &result {
            Ok(text) => info!(
                model = %model,
                output_len = text.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "模型调用完成"
            ),
            Err(e) => warn!(model = %model, error = %e, "模型调用失败"),
        }
        result
    }
}
