//! Japanese quality benchmark across models.
//!
//! Each prompt of a set is sent once, sequentially, to each model. Answers
//! are scored with [`quality::score`] and summarized per model.

pub mod prompts;
pub mod quality;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BenchConfig;
use crate::error::{Result, SmokeError};
use crate::probe::{ChatMessage, ChatOptions, ProbeClient};

pub use prompts::{BenchPrompt, PromptKind, MT_BENCH_JAPANESE, QUICK_JAPANESE};

/// Benchmark results file name
pub const RESULTS_FILE: &str = "mt_bench_results.json";

/// One prompt sent to one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRecord {
    /// Prompt category
    pub category: String,
    /// Prompt text
    pub question: String,
    /// Prompt kind
    #[serde(rename = "type")]
    pub kind: PromptKind,
    /// Answer, when one was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Why no answer was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Round-trip time, seconds
    pub response_time: f64,
    /// 0–10 score, when answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
    /// Answer contains Japanese
    pub has_japanese: bool,
}

impl BenchRecord {
    /// An answer was received
    pub fn succeeded(&self) -> bool {
        self.response.is_some()
    }
}

/// All records for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRun {
    /// Model name
    pub model: String,
    /// When the model's run started
    pub timestamp: DateTime<Utc>,
    /// Records in prompt order
    pub tests: Vec<BenchRecord>,
}

/// Average quality of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryQuality {
    /// Prompt category
    pub category: String,
    /// Average score (failures count 0)
    pub average: f64,
}

/// Aggregates for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBenchSummary {
    /// Model name
    pub model: String,
    /// Prompts answered
    pub succeeded: usize,
    /// Prompts sent
    pub total: usize,
    /// Mean round-trip over all prompts, seconds
    pub avg_response_time: f64,
    /// Mean score over all prompts (failures count 0)
    pub avg_quality: f64,
    /// Per-category average, in prompt order
    pub categories: Vec<CategoryQuality>,
    /// More than half of the answers contain Japanese
    pub japanese_support: bool,
}

impl ModelBenchSummary {
    /// Summarize one model's records
    pub fn from_run(run: &ModelRun) -> Self {
        let tests = &run.tests;
        let succeeded = tests.iter().filter(|r| r.succeeded()).count();
        let mean = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };
        let quality = |r: &BenchRecord| f64::from(r.quality_score.unwrap_or(0));

        let mut categories: Vec<(String, f64, usize)> = Vec::new();
        for record in tests {
            match categories.iter_mut().find(|(c, _, _)| *c == record.category) {
                Some((_, sum, n)) => {
                    *sum += quality(record);
                    *n += 1;
                },
                None => categories.push((record.category.clone(), quality(record), 1)),
            }
        }

        let japanese = tests.iter().filter(|r| r.succeeded() && r.has_japanese).count();

        Self {
            model: run.model.clone(),
            succeeded,
            total: tests.len(),
            avg_response_time: mean(tests.iter().map(|r| r.response_time).sum(), tests.len()),
            avg_quality: mean(tests.iter().map(quality).sum(), tests.len()),
            categories: categories
                .into_iter()
                .map(|(category, sum, n)| CategoryQuality {
                    category,
                    average: mean(sum, n),
                })
                .collect(),
            japanese_support: japanese * 2 > succeeded,
        }
    }

    /// Percentage of prompts answered
    pub fn success_rate(&self) -> f64 {
        crate::harness::success_rate(self.succeeded, self.total)
    }
}

/// Everything written to [`RESULTS_FILE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    /// Run start
    pub timestamp: DateTime<Utc>,
    /// Server under test
    pub base_url: String,
    /// Per-model records
    pub runs: Vec<ModelRun>,
    /// Per-model aggregates
    pub summaries: Vec<ModelBenchSummary>,
}

impl BenchReport {
    /// Bundle runs with their summaries
    pub fn new(timestamp: DateTime<Utc>, base_url: &str, runs: Vec<ModelRun>) -> Self {
        let summaries = runs.iter().map(ModelBenchSummary::from_run).collect();
        Self {
            timestamp,
            base_url: base_url.to_string(),
            runs,
            summaries,
        }
    }

    /// Write [`RESULTS_FILE`] into `dir`
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .map_err(|e| SmokeError::Report(format!("Failed to create {}: {e}", dir.display())))?;
        let path = dir.join(RESULTS_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)
            .map_err(|e| SmokeError::Report(format!("Failed to write {}: {e}", path.display())))?;
        tracing::info!("wrote {}", path.display());
        Ok(path)
    }

    /// Console summary of every model
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "=".repeat(60));
        let _ = writeln!(out, "📊 Benchmark summary");
        let _ = writeln!(out, "{}", "=".repeat(60));

        for summary in &self.summaries {
            let _ = writeln!(out, "\n🤖 Model: {}", summary.model);
            let _ = writeln!(
                out,
                "Success rate:      {}/{} ({:.1}%)",
                summary.succeeded,
                summary.total,
                summary.success_rate()
            );
            let _ = writeln!(out, "Avg response time: {:.2}s", summary.avg_response_time);
            let _ = writeln!(out, "Avg quality:       {:.1}/10", summary.avg_quality);
            let _ = writeln!(
                out,
                "Japanese support:  {}",
                if summary.japanese_support { "✅ yes" } else { "❌ no" }
            );
            let _ = writeln!(out, "By category:");
            for category in &summary.categories {
                let _ = writeln!(out, "  {}: {:.1}/10", category.category, category.average);
            }
        }
        out
    }
}

type RecordObserver = Box<dyn FnMut(usize, usize, &BenchRecord) + Send>;

/// Sends prompt sets to models through a [`ProbeClient`].
pub struct BenchRunner {
    probe: ProbeClient,
    options: ChatOptions,
    observers: Vec<RecordObserver>,
}

impl BenchRunner {
    /// Runner using the configured sampling settings
    pub fn new(probe: ProbeClient, config: &BenchConfig) -> Self {
        Self {
            probe,
            options: ChatOptions::default()
                .with_temperature(config.temperature)
                .with_max_tokens(config.max_tokens),
            observers: Vec::new(),
        }
    }

    /// Call `observer(index, total, record)` after each prompt
    pub fn on_record(&mut self, observer: impl FnMut(usize, usize, &BenchRecord) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Send every prompt to `model`, in order.
    pub async fn run_model(&mut self, model: &str, prompts: &[BenchPrompt]) -> ModelRun {
        tracing::info!("benchmarking {} with {} prompts", model, prompts.len());
        let timestamp = Utc::now();
        let mut tests = Vec::with_capacity(prompts.len());

        for (i, prompt) in prompts.iter().enumerate() {
            let start = Instant::now();
            let reply = self
                .probe
                .chat(model, &[ChatMessage::user(prompt.question)], &self.options)
                .await;
            let response_time = start.elapsed().as_secs_f64();

            let record = match reply {
                Ok(reply) => BenchRecord {
                    category: prompt.category.to_string(),
                    question: prompt.question.to_string(),
                    kind: prompt.kind,
                    quality_score: Some(quality::score(&reply.content, prompt.kind)),
                    has_japanese: quality::has_japanese(&reply.content),
                    response: Some(reply.content),
                    error: None,
                    response_time,
                },
                Err(e) => {
                    tracing::warn!("{} / {}: {}", model, prompt.category, e);
                    BenchRecord {
                        category: prompt.category.to_string(),
                        question: prompt.question.to_string(),
                        kind: prompt.kind,
                        response: None,
                        error: Some(e.to_string()),
                        response_time,
                        quality_score: None,
                        has_japanese: false,
                    }
                },
            };

            for observer in &mut self.observers {
                observer(i + 1, prompts.len(), &record);
            }
            tests.push(record);
        }

        ModelRun {
            model: model.to_string(),
            timestamp,
            tests,
        }
    }

    /// Run every model in turn
    pub async fn run_models(&mut self, models: &[String], prompts: &[BenchPrompt]) -> Vec<ModelRun> {
        let mut runs = Vec::with_capacity(models.len());
        for model in models {
            runs.push(self.run_model(model, prompts).await);
        }
        runs
    }
}

/// Progress lines for one record
pub fn render_record(index: usize, total: usize, record: &BenchRecord) -> String {
    let preview: String = record.question.chars().take(50).collect();
    let mut out = String::new();
    let _ = writeln!(out, "\n📝 Test {index}/{total} - {}", record.category);
    let _ = writeln!(out, "Question: {preview}...");
    match (&record.response, &record.error) {
        (Some(response), _) => {
            let head: String = response.chars().take(100).collect();
            let _ = writeln!(out, "✅ Response received in {:.2}s", record.response_time);
            let _ = writeln!(out, "Response preview: {head}...");
        },
        (None, error) => {
            let _ = writeln!(
                out,
                "❌ Failed to get response: {}",
                error.as_deref().unwrap_or("unknown error")
            );
        },
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, ok: bool, score: u8, japanese: bool, secs: f64) -> BenchRecord {
        BenchRecord {
            category: category.to_string(),
            question: "質問".to_string(),
            kind: PromptKind::Greeting,
            response: ok.then(|| "こんにちは。".to_string()),
            error: (!ok).then(|| "HTTP 500: boom".to_string()),
            response_time: secs,
            quality_score: ok.then_some(score),
            has_japanese: japanese,
        }
    }

    fn run(tests: Vec<BenchRecord>) -> ModelRun {
        ModelRun {
            model: "gemma3:1b".to_string(),
            timestamp: Utc::now(),
            tests,
        }
    }

    #[test]
    fn test_summary_counts_failures_as_zero_quality() {
        let summary = ModelBenchSummary::from_run(&run(vec![
            record("Math", true, 8, true, 1.0),
            record("Math", false, 0, false, 3.0),
            record("Writing", true, 10, true, 2.0),
        ]));

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.total, 3);
        assert!((summary.avg_response_time - 2.0).abs() < 1e-9);
        assert!((summary.avg_quality - 6.0).abs() < 1e-9);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].category, "Math");
        assert!((summary.categories[0].average - 4.0).abs() < 1e-9);
        assert!((summary.categories[1].average - 10.0).abs() < 1e-9);
        assert!(summary.japanese_support);
    }

    #[test]
    fn test_japanese_support_needs_strict_majority() {
        let summary = ModelBenchSummary::from_run(&run(vec![
            record("A", true, 5, true, 1.0),
            record("B", true, 5, false, 1.0),
        ]));
        assert!(!summary.japanese_support);
    }

    #[test]
    fn test_empty_run_summary() {
        let summary = ModelBenchSummary::from_run(&run(Vec::new()));
        assert_eq!(summary.total, 0);
        assert_eq!(summary.avg_quality, 0.0);
        assert_eq!(summary.success_rate(), 0.0);
        assert!(!summary.japanese_support);
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record("Math", false, 0, false, 1.5)).unwrap();
        assert_eq!(json["type"], "greeting");
        assert_eq!(json["error"], "HTTP 500: boom");
        assert!(json.get("response").is_none());
        assert!(json.get("quality_score").is_none());
    }

    #[test]
    fn test_report_written_with_japanese_intact() {
        let dir = tempfile::tempdir().unwrap();
        let report = BenchReport::new(
            Utc::now(),
            "http://localhost:11434",
            vec![run(vec![record("Writing", true, 9, true, 1.0)])],
        );

        let path = report.write(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), RESULTS_FILE);
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("こんにちは。"));

        let back: BenchReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.summaries, report.summaries);
    }

    #[test]
    fn test_render_record_and_summary() {
        let ok = render_record(1, 8, &record("Writing", true, 9, true, 1.234));
        assert!(ok.contains("📝 Test 1/8 - Writing"));
        assert!(ok.contains("✅ Response received in 1.23s"));

        let failed = render_record(2, 8, &record("Math", false, 0, false, 0.5));
        assert!(failed.contains("❌ Failed to get response: HTTP 500: boom"));

        let report = BenchReport::new(Utc::now(), "http://x", vec![run(vec![record("Math", true, 7, true, 1.0)])]);
        let text = report.render_summary();
        assert!(text.contains("🤖 Model: gemma3:1b"));
        assert!(text.contains("Success rate:      1/1 (100.0%)"));
        assert!(text.contains("  Math: 7.0/10"));
    }
}
