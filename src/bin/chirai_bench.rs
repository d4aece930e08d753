//! ChirAI Japanese benchmark CLI.
//!
//! Sends a Japanese prompt set to each model in turn, scores the answers and
//! writes `mt_bench_results.json`.

use std::path::PathBuf;

use chirai::{
    bench::{render_record, BenchReport, BenchRunner, MT_BENCH_JAPANESE, QUICK_JAPANESE},
    Config, ProbeClient, VERSION,
};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// Eight categories, long-form answers
    MtBench,
    /// Five short prompts
    Quick,
}

#[derive(Parser)]
#[command(name = "chirai-bench")]
#[command(version = VERSION)]
#[command(about = "Japanese quality benchmark for local LLM models", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/chirai/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Model to benchmark (repeatable; overrides config)
    #[arg(short, long = "model")]
    models: Vec<String>,

    /// Prompt set
    #[arg(short, long, value_enum, default_value = "mt-bench")]
    preset: Preset,

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
    if !cli.models.is_empty() {
        config.bench.models = cli.models;
    }
    config.validate()?;
    if config.bench.models.is_empty() {
        anyhow::bail!("no models to benchmark");
    }

    let prompts = match cli.preset {
        Preset::MtBench => MT_BENCH_JAPANESE,
        Preset::Quick => QUICK_JAPANESE,
    };

    let probe = ProbeClient::new(&config.server)?;
    let base_url = probe.base_url().to_string();
    let mut runner = BenchRunner::new(probe, &config.bench);
    runner.on_record(|index, total, record| print!("{}", render_record(index, total, record)));

    let started = chrono::Utc::now();
    let mut runs = Vec::with_capacity(config.bench.models.len());
    for model in &config.bench.models {
        println!("\n🧪 Testing model: {model}");
        println!("{}", "=".repeat(60));
        runs.push(runner.run_model(model, prompts).await);
    }

    let report = BenchReport::new(started, &base_url, runs);
    print!("{}", report.render_summary());

    let path = report.write(&config.report.output_dir)?;
    println!("\n💾 Detailed results saved to: {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "chirai-bench",
            "--log-json",
            "--preset",
            "quick",
            "-m",
            "gemma3:1b",
            "-m",
            "gemma3:4b",
        ])
        .unwrap();
        assert!(cli.log_json);
        assert!(matches!(cli.preset, Preset::Quick));
        assert_eq!(cli.models, ["gemma3:1b", "gemma3:4b"]);

        let cli = Cli::try_parse_from(["chirai-bench"]).unwrap();
        assert!(matches!(cli.preset, Preset::MtBench));
        assert!(!cli.log_json);
    }
}
