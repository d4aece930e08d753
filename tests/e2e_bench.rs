//! End-to-end benchmark runs against a stub server, plus an opt-in run
//! against a real local server.

mod common;

use chirai::bench::{BenchReport, BenchRunner, ModelBenchSummary, MT_BENCH_JAPANESE, QUICK_JAPANESE};
use chirai::config::BenchConfig;
use chirai::{Config, ProbeClient};
use common::{probe, spawn};

#[tokio::test]
async fn test_quick_preset_scores_every_prompt() {
    let base = spawn(common::healthy_router()).await;
    let mut runner = BenchRunner::new(probe(&base), &BenchConfig::default());

    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&seen);
    runner.on_record(move |index, total, record| {
        sink.lock().unwrap().push((index, total, record.category.clone()));
    });

    let run = runner.run_model("gemma3:1b", QUICK_JAPANESE).await;
    assert_eq!(run.tests.len(), 5);
    assert!(run.tests.iter().all(|r| r.succeeded() && r.has_japanese));
    assert!(run.tests.iter().all(|r| r.quality_score.is_some()));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0], (1, 5, "General".to_string()));

    let summary = ModelBenchSummary::from_run(&run);
    assert_eq!(summary.succeeded, 5);
    assert!(summary.japanese_support);
    assert_eq!(summary.categories.len(), 5);
}

#[tokio::test]
async fn test_failed_model_records_errors() {
    let base = spawn(common::healthy_router()).await;
    let mut runner = BenchRunner::new(probe(&base), &BenchConfig::default());

    let runs = runner
        .run_models(
            &["gemma3:1b".to_string(), "invalid:model".to_string()],
            MT_BENCH_JAPANESE,
        )
        .await;
    assert_eq!(runs.len(), 2);

    let report = BenchReport::new(chrono::Utc::now(), &base, runs);
    let bad = &report.summaries[1];
    assert_eq!(bad.model, "invalid:model");
    assert_eq!(bad.succeeded, 0);
    assert_eq!(bad.total, 8);
    assert_eq!(bad.avg_quality, 0.0);
    assert!(report.runs[1].tests.iter().all(|r| r.error.as_deref().is_some_and(|e| e.contains("404"))));

    let dir = tempfile::tempdir().unwrap();
    let path = report.write(dir.path()).unwrap();
    assert!(path.ends_with("mt_bench_results.json"));
}

/// Requires a running server; set CHIRAI_BASE_URL (or a .env file) to target
/// something other than localhost.
#[tokio::test]
#[ignore] // Run with: cargo test test_live_server_quick_bench -- --ignored --nocapture
async fn test_live_server_quick_bench() {
    dotenvy::dotenv().ok();
    let config = Config::load(None).unwrap();
    let probe = ProbeClient::new(&config.server).unwrap();

    let models = probe.list_models().await.expect("server must be reachable");
    let Some(model) = models.first() else {
        panic!("server lists no models");
    };

    let mut runner = BenchRunner::new(probe, &config.bench);
    let run = runner.run_model(&model.name, QUICK_JAPANESE).await;
    let summary = ModelBenchSummary::from_run(&run);
    println!("{summary:#?}");
    assert!(summary.succeeded > 0);
}
