use anyhow::Result;
use clap::Parser;
use research_assistant::cli::Args;
use research_assistant::{PipelineFailure, launch};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "research_assistant=debug"
    } else {
        "research_assistant=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let query = args.query.clone();
    let config = args.into_config()?;
    init_tracing(config.verbose);

    let outcome = match launch(&config, &query).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(failure) = e.downcast_ref::<PipelineFailure>() {
                for diagnostic in failure.state.diagnostics() {
                    eprintln!("⚠️ {}", diagnostic);
                }
            }
            return Err(e);
        }
    };

    if let Some(report) = outcome.state.final_report() {
        println!("\n{}", report);
    }

    let stats = outcome.state.stats();
    println!(
        "📊 子问题: {} 个，来源: {} 个，诊断信息: {} 条",
        stats.sub_questions, stats.sources, stats.diagnostics
    );
    for diagnostic in outcome.state.diagnostics() {
        println!("   ⚠️ {}", diagnostic);
    }
    if let Some(path) = &outcome.report_path {
        println!("💾 报告已保存: {}", path.display());
    }
    println!("\n{}", outcome.timing_report);

    Ok(())
}
