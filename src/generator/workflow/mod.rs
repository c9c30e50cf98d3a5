use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::error::ResearchError;
use crate::generator::context::GeneratorContext;
use crate::generator::coordination::Coordinator;
use crate::generator::finalization::Finalizer;
use crate::generator::outlet;
use crate::generator::research::Researcher;
use crate::generator::state::ResearchState;
use crate::generator::synthesis::Synthesizer;
use crate::generator::types::{PipelineFailure, Stage, StageResult};
use crate::llm::LLMClient;
use crate::search::TavilyClient;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<&'static str, Instant>,
    phase_durations: HashMap<&'static str, Duration>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: HashMap::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &'static str) {
        self.phase_start_times.insert(phase_name, Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &'static str) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(phase_name)?;
        let duration = start_time.elapsed();
        self.phase_durations.insert(phase_name, duration);
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn get_phase_duration(&self, phase_name: &str) -> Option<Duration> {
        self.phase_durations.get(phase_name).copied()
    }

    /// 获取格式化的执行时间报告，阶段按流水线顺序排列
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for phase in TimingKeys::get_all_phase_keys() {
                if let Some(duration) = self.phase_durations.get(phase) {
                    report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
                }
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const COORDINATION: &'static str = "coordination";
    pub const RESEARCH: &'static str = "research";
    pub const SYNTHESIS: &'static str = "synthesis";
    pub const FINALIZATION: &'static str = "finalization";
    pub const OUTPUT: &'static str = "output";

    /// 获取所有阶段的键列表
    pub fn get_all_phase_keys() -> Vec<&'static str> {
        vec![
            Self::COORDINATION,
            Self::RESEARCH,
            Self::SYNTHESIS,
            Self::FINALIZATION,
            Self::OUTPUT,
        ]
    }
}

/// 一次成功调研的产物
#[derive(Debug)]
pub struct LaunchOutcome {
    pub state: ResearchState,
    /// 报告保存路径，未保存时为 None
    pub report_path: Option<PathBuf>,
    pub timing_report: String,
}

async fn run_stage<S: Stage>(
    stage: &S,
    key: &'static str,
    label: &str,
    context: &GeneratorContext,
    state: ResearchState,
    timing: &mut TimingScope,
) -> StageResult {
    if state.phase() != stage.phase() {
        let error = ResearchError::state(format!(
            "{} 阶段要求状态处于 {}，当前为 {}",
            key,
            stage.phase(),
            state.phase()
        ));
        return Err(PipelineFailure::new(state, error));
    }

    println!("🤖 {}...", label);
    timing.start_phase(key);
    let result = stage.execute(context, state).await;
    let elapsed_ms = timing
        .end_phase(key)
        .map_or(0, |duration| duration.as_millis() as u64);

    match &result {
        Ok(_) => {
            info!(stage = key, elapsed_ms, "阶段完成");
            println!("✓ {}完成", label);
        }
        Err(failure) => {
            warn!(stage = key, elapsed_ms, error = %failure.error, "阶段失败");
            println!("❌ {}失败: {}", label, failure.error);
        }
    }
    result
}

async fn run_stages(
    context: &GeneratorContext,
    state: ResearchState,
    timing: &mut TimingScope,
) -> StageResult {
    let state = run_stage(
        &Coordinator,
        TimingKeys::COORDINATION,
        "拆解子问题",
        context,
        state,
        timing,
    )
    .await?;
    if let Some(questions) = state.sub_questions() {
        for question in questions {
            println!("   🔭 {}", question);
        }
    }

    let state = run_stage(
        &Researcher,
        TimingKeys::RESEARCH,
        "检索网络资料",
        context,
        state,
        timing,
    )
    .await?;
    println!("   📚 共收集 {} 个来源", state.sources().len());

    let state = run_stage(
        &Synthesizer,
        TimingKeys::SYNTHESIS,
        "综合生成草稿",
        context,
        state,
        timing,
    )
    .await?;

    run_stage(
        &Finalizer,
        TimingKeys::FINALIZATION,
        "润色最终报告",
        context,
        state,
        timing,
    )
    .await
}

/// 按 Coordination → Research → Synthesis → Finalization 顺序执行一次调研
pub async fn run_pipeline(context: &GeneratorContext, state: ResearchState) -> StageResult {
    let mut timing = TimingScope::new();
    run_pipeline_timed(context, state, &mut timing).await
}

async fn run_pipeline_timed(
    context: &GeneratorContext,
    state: ResearchState,
    timing: &mut TimingScope,
) -> StageResult {
    let span = info_span!("research", run_id = %state.run_id());
    async move {
        info!(query = state.original_query(), "开始调研");
        let result = run_stages(context, state, timing).await;
        match &result {
            Ok(state) => {
                let stats = state.stats();
                info!(
                    sub_questions = stats.sub_questions,
                    sources = stats.sources,
                    diagnostics = stats.diagnostics,
                    "调研完成"
                );
            }
            Err(failure) => warn!(failed_at = %failure.failed_at, "调研失败"),
        }
        result
    }
    .instrument(span)
    .await
}

/// 启动一次调研：校验配置、检查模型连接、执行流水线并保存报告
pub async fn launch(config: &Config, query: &str) -> Result<LaunchOutcome> {
    config.validate()?;
    let state = ResearchState::new(query)?;

    let llm = LLMClient::new(config.llm.clone())?;
    if !config.skip_connection_check {
        llm.check_connection().await?;
    }
    let search = TavilyClient::new(&config.search)?;
    let context = GeneratorContext::with_services(config.clone(), Arc::new(llm), Arc::new(search));

    println!(
        "🚀 开始调研: {}（报告语言: {}）",
        query.trim(),
        config.target_language.display_name()
    );
    let mut timing = TimingScope::new();
    let state = run_pipeline_timed(&context, state, &mut timing).await?;

    let report_path = if config.save_report {
        timing.start_phase(TimingKeys::OUTPUT);
        let path = outlet::save(&config.output_path, &state).await?;
        timing.end_phase(TimingKeys::OUTPUT);
        Some(path)
    } else {
        None
    };

    let timing_report = timing.generate_timing_report();
    info!("{}", timing_report.trim_end());

    Ok(LaunchOutcome {
        state,
        report_path,
        timing_report,
    })
}
