#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMConfig, LLMProvider, PipelineConfig, SearchConfig};
    use crate::i18n::TargetLanguage;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.llm.api_key = "llm-key".to_string();
        config.search.api_key = "search-key".to_string();
        config
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.output_path, PathBuf::from("./research.reports"));
        assert_eq!(config.target_language, TargetLanguage::English);
        assert!(config.save_report);
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::Gemini);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "gemini".parse::<LLMProvider>().unwrap(),
            LLMProvider::Gemini
        );
        assert_eq!(
            "Google".parse::<LLMProvider>().unwrap(),
            LLMProvider::Gemini
        );
        assert_eq!(
            "anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(LLMProvider::OpenRouter.to_string(), "openrouter");
        assert_eq!(LLMProvider::Gemini.to_string(), "gemini");
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::Gemini);
        // api_key may be empty if env var is not set
        assert!(config.api_base_url.is_empty());
        assert!(!config.model_efficient.is_empty());
        assert!(!config.model_powerful.is_empty());
        assert_eq!(config.max_tokens, 8192);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_search_and_pipeline_defaults() {
        let search = SearchConfig::default();
        assert_eq!(search.api_base_url, "https://api.tavily.com");
        assert_eq!(search.max_results, 5);
        assert_eq!(search.max_parallels, 3);
        assert_eq!(search.search_depth, "basic");

        let pipeline = PipelineConfig::default();
        assert_eq!(pipeline.max_sub_questions, 5);
        assert!(!pipeline.fallback_to_draft);
        assert!(pipeline.excerpt_char_limit > 0);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_llm_key() {
        let mut config = valid_config();
        config.llm.api_key = "  ".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_validate_allows_keyless_ollama() {
        let mut config = valid_config();
        config.llm.provider = LLMProvider::Ollama;
        config.llm.api_key = String::new();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_search_key() {
        let mut config = valid_config();
        config.search.api_key = String::new();

        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = valid_config();
        config.search.max_results = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.search.max_parallels = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.pipeline.max_sub_questions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial_toml_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("research.toml");

        let content = r#"
target_language = "de"

[llm]
provider = "openai"
api_key = "sk-test"
model_efficient = "gpt-4o-mini"
model_powerful = "gpt-4o"

[search]
api_key = "tvly-test"
max_results = 3

[pipeline]
fallback_to_draft = true
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.target_language, TargetLanguage::German);
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model_powerful, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.search.api_key, "tvly-test");
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.search.max_parallels, 3);
        assert!(config.pipeline.fallback_to_draft);
        assert_eq!(config.pipeline.max_sub_questions, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_missing_file() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/research.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("research.toml");
        std::fs::write(&config_path, "[llm\nprovider = ").unwrap();

        assert!(Config::from_file(&config_path).is_err());
    }
}
