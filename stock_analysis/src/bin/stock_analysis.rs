use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use stock_analysis::{
    cache::CsvCache,
    charts::ChartSet,
    cli::{AnalyzeArgs, Cli, Cmd},
    errors::AnalysisError,
    export::export_to_path,
    pipeline::Pipeline,
    presenter::{ConsolePresenter, Presenter},
};
use tracing::error;

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let today = chrono::Utc::now().date_naive();
    let plan = args
        .resolve(today)
        .map_err(|source| AnalysisError::InvalidConfig { source })?;

    let provider = plan
        .provider
        .build()
        .context("failed to initialize data provider")?;
    let pipeline = Pipeline::with_provider(provider);
    let report = pipeline.run(&plan.request).await?;

    let stdout = std::io::stdout().lock();
    ConsolePresenter::new(stdout)
        .with_table(plan.output.table)
        .present(&report)?;

    if let Some(target) = &plan.output.csv {
        let bytes = CsvCache::new().get_or_render(&report.series)?;
        let path = export_to_path(&bytes, target, &report.request.export_file_name())?;
        eprintln!("CSV written to {}", path.display());
    }
    if let Some(path) = &plan.output.chart {
        ChartSet::from_report(&report).write_json(path)?;
        eprintln!("Chart spec written to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Cmd::Analyze(args) => analyze(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AnalysisError>() {
                Some(analysis) => {
                    error!(kind = analysis.kind(), "{analysis}");
                    eprintln!("{}", analysis.user_message());
                }
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
