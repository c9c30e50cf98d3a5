use crate::config::{Config, DEFAULT_CONFIG_FILE, LLMProvider};
use crate::i18n::TargetLanguage;
use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;

/// research-assistant - 由Rust与大模型驱动的多阶段调研助手
#[derive(Parser, Debug)]
#[command(name = "research-assistant")]
#[command(
    about = "Multi-stage research assistant. It decomposes a question into sub-questions, searches the web for each of them, and writes a cited markdown report."
)]
#[command(version)]
pub struct Args {
    /// 调研问题
    pub query: String,

    /// 配置文件路径，未指定时尝试读取当前目录下的 research.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 报告输出目录
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider (gemini, openai, anthropic, deepseek, mistral, openrouter, moonshot, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 高能效模型，用于子问题拆解
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于草稿综合与报告润色
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 搜索服务 API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 每个子问题保留的搜索结果数
    #[arg(long)]
    pub max_results: Option<usize>,

    /// 搜索请求的最大并发数
    #[arg(long)]
    pub max_parallels: Option<usize>,

    /// 子问题数量上限
    #[arg(long)]
    pub max_sub_questions: Option<usize>,

    /// 目标语言 (zh, en, ja, ko, de, fr, ru)
    #[arg(long)]
    pub target_language: Option<String>,

    /// 报告润色失败时使用草稿作为最终报告
    #[arg(long)]
    pub fallback_to_draft: bool,

    /// 不把报告写入磁盘
    #[arg(long)]
    pub no_save: bool,

    /// 跳过启动时的模型连接检查
    #[arg(long)]
    pub skip_connection_check: bool,
}

impl Args {
    /// 将CLI参数转换为配置，命令行参数覆盖配置文件
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(config_path) => Config::from_file(config_path)?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);
                if default_config_path.exists() {
                    Config::from_file(&default_config_path)?
                } else {
                    Config::default()
                }
            }
        };

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            config.llm.provider = provider_str.parse::<LLMProvider>().map_err(|e| anyhow!(e))?;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 覆盖搜索配置
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(max_results) = self.max_results {
            config.search.max_results = max_results;
        }
        if let Some(max_parallels) = self.max_parallels {
            config.search.max_parallels = max_parallels;
        }

        if let Some(max_sub_questions) = self.max_sub_questions {
            config.pipeline.max_sub_questions = max_sub_questions;
        }
        if let Some(target_language_str) = self.target_language {
            config.target_language = target_language_str
                .parse::<TargetLanguage>()
                .map_err(|e| anyhow!(e))?;
        }

        // 开关类参数只能打开，不会覆盖配置文件中已打开的选项
        if self.fallback_to_draft {
            config.pipeline.fallback_to_draft = true;
        }
        if self.no_save {
            config.save_report = false;
        }
        if self.skip_connection_check {
            config.skip_connection_check = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        Ok(config)
    }
}
