pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod llm;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ResearchError, ResearchResult};
pub use generator::context::GeneratorContext;
pub use generator::state::{PipelinePhase, ResearchState, RunStats, SearchHit};
pub use generator::types::PipelineFailure;
pub use generator::workflow::{LaunchOutcome, launch, run_pipeline};
pub use llm::{LanguageModel, ModelTier};
pub use search::SearchEngine;
