//! ChirAI smoke-test CLI.
//!
//! Runs the full battery against an inference server, prints progress and a
//! graded summary, and writes the report artifacts. The exit status is 0
//! whatever the grade; only a setup failure (bad config, unwritable output
//! directory) exits non-zero.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chirai::{
    build_suite,
    report::{self, console},
    Config, ProbeClient, RunReport, SuiteContext, VERSION,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "chirai-smoke")]
#[command(version = VERSION)]
#[command(about = "End-to-end smoke tests for a local LLM inference server", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/chirai/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Report output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip the SVG dashboard
    #[arg(long)]
    no_chart: bool,

    /// Print the JSON report to stdout instead of the console summary
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let mut config = Config::load(cli.config)?;
    if let Some(url) = cli.base_url {
        config.server.base_url = url;
    }
    if let Some(dir) = cli.output_dir {
        config.report.output_dir = dir;
    }
    if cli.no_chart {
        config.report.chart = false;
    }
    config.validate()?;

    let probe = ProbeClient::new(&config.server)?;
    let base_url = probe.base_url().to_string();
    let ctx = Arc::new(SuiteContext::new(probe, config.suite.clone()));
    let mut harness = build_suite(ctx)?;

    let started = chrono::Utc::now();
    if !cli.json {
        print!("{}", console::render_header(&base_url, started));
        harness.on_event(console::progress_printer());
    }

    let clock = Instant::now();
    let results = harness.run_all().await;
    let report = RunReport::new(results, started, clock.elapsed(), &base_url);

    let paths = report::write_all(&report, &config.report)?;

    if cli.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    print!("{}", console::render_summary(&report));
    println!();
    for path in [&paths.json, &paths.markdown, &paths.chart].into_iter().flatten() {
        println!("📄 {}", path.display());
    }

    Ok(())
}
