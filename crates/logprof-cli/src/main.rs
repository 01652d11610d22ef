use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use logprof_core::{AggregationState, LineSource, ReportBuilder};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod config;
mod discover;
mod render;

use config::Config;

#[derive(Parser)]
#[command(name = "logprof")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Generates a ranked performance report of the slowest URLs in an nginx access log"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, value_name = "FILE", default_value = "./config.json")]
    config: PathBuf,

    /// Path to the HTML report template
    #[arg(long, value_name = "FILE", default_value = "./report.html")]
    template: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging destination comes from the config, so load it first; failures
    // here can only go to stderr.
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose, config.log_file.as_deref());

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Report generation failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    tracing::info!("Starting with config {}", cli.config.display());

    let Some(log) = discover::find_latest(&config.log_dir)? else {
        tracing::info!("No access logs found in {}", config.log_dir.display());
        return Ok(());
    };
    tracing::info!("Selected log file: {}", log.path.display());

    let report_path = config
        .report_dir
        .join(format!("report-{}.html", log.date.format("%Y.%m.%d")));
    if report_path.exists() {
        tracing::info!(
            "Report {} already exists; nothing to do",
            report_path.display()
        );
        return Ok(());
    }

    let source = LineSource::open(&log.path, log.compressed)
        .with_context(|| format!("failed to open log file {}", log.path.display()))?;
    let state = AggregationState::from_lines(source)?;
    let rows = ReportBuilder::new(config.report_size, config.error_percent).build(&state)?;

    // The directory is created only once a report will actually be written;
    // the exists() probe above is fine on a not-yet-created directory, and a
    // failed run must leave no reports directory behind.
    std::fs::create_dir_all(&config.report_dir).with_context(|| {
        format!(
            "failed to create report directory {}",
            config.report_dir.display()
        )
    })?;
    render::render_report(&cli.template, &report_path, &rows)?;

    println!(
        "{} {} ({} rows)",
        style("Report written:").bold().green(),
        report_path.display(),
        rows.len()
    );
    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) {
    if let Some(path) = log_file {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter(verbose))
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::sync::Arc::new(file))
                    .init();
                return;
            }
            Err(err) => {
                eprintln!(
                    "warning: cannot open log file {}: {err}; logging to stderr",
                    path.display()
                );
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn env_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    if verbose {
        EnvFilter::new("logprof=debug,logprof_core=debug")
    } else {
        EnvFilter::new("logprof=info,logprof_core=info")
    }
}
