use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ResearchError, ResearchResult};
use crate::i18n::TargetLanguage;

/// 默认配置文件名，位于当前工作目录
pub const DEFAULT_CONFIG_FILE: &str = "research.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    #[default]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl LLMProvider {
    /// 本地部署的Provider无需API KEY
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LLMProvider::Ollama)
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" | "google" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 报告输出目录
    pub output_path: PathBuf,

    /// 报告语言
    pub target_language: TargetLanguage,

    /// 是否把最终报告写入磁盘
    pub save_report: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 网络搜索配置
    pub search: SearchConfig,

    /// 流水线行为配置
    pub pipeline: PipelineConfig,

    /// 启动时跳过模型连接检查
    pub skip_connection_check: bool,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址，为空时使用Provider的官方地址
    pub api_base_url: String,

    /// 高能效模型，用于子问题拆解
    pub model_efficient: String,

    /// 高质量模型，用于综合与润色
    pub model_powerful: String,

    /// 最大输出tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,
}

/// 网络搜索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 搜索服务 API KEY
    pub api_key: String,

    /// 搜索服务地址
    pub api_base_url: String,

    /// 每个子问题保留的结果数上限（top-K）
    pub max_results: usize,

    /// 搜索深度：basic / advanced
    pub search_depth: String,

    /// 子问题并发搜索的最大并发数
    pub max_parallels: usize,

    /// 单次请求超时时间（秒）
    pub timeout_seconds: u64,
}

/// 流水线行为配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// 子问题数量上限
    pub max_sub_questions: usize,

    /// 润色失败时是否退回草稿作为最终报告
    pub fallback_to_draft: bool,

    /// 写入综合提示词时每条摘录的最大字符数
    pub excerpt_char_limit: usize,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 启动时校验配置，缺失凭据属于致命的配置错误
    pub fn validate(&self) -> ResearchResult<()> {
        if self.llm.provider.requires_api_key() && self.llm.api_key.trim().is_empty() {
            return Err(ResearchError::config(format!(
                "未配置 {} 的 API KEY（可通过 --llm-api-key 或环境变量 RESEARCH_LLM_API_KEY 设置）",
                self.llm.provider
            )));
        }
        if self.search.api_key.trim().is_empty() {
            return Err(ResearchError::config(
                "未配置搜索服务 API KEY（可通过 --search-api-key 或环境变量 TAVILY_API_KEY 设置）",
            ));
        }
        if self.llm.model_efficient.trim().is_empty() || self.llm.model_powerful.trim().is_empty()
        {
            return Err(ResearchError::config("模型名称不能为空"));
        }
        if self.search.max_results == 0 {
            return Err(ResearchError::config("search.max_results 必须大于0"));
        }
        if self.search.max_parallels == 0 {
            return Err(ResearchError::config("search.max_parallels 必须大于0"));
        }
        if self.pipeline.max_sub_questions == 0 {
            return Err(ResearchError::config("pipeline.max_sub_questions 必须大于0"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./research.reports"),
            target_language: TargetLanguage::default(),
            save_report: true,
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            pipeline: PipelineConfig::default(),
            skip_connection_check: false,
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("RESEARCH_LLM_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .unwrap_or_default(),
            api_base_url: String::new(),
            model_efficient: String::from("gemini-2.0-flash"),
            model_powerful: String::from("gemini-2.5-pro"),
            max_tokens: 8192,
            temperature: 0.3,
            timeout_seconds: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TAVILY_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            max_results: 5,
            search_depth: String::from("basic"),
            max_parallels: 3,
            timeout_seconds: 30,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_sub_questions: 5,
            fallback_to_draft: false,
            excerpt_char_limit: 1200,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
