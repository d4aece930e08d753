//! Report emitter: console, JSON, Markdown and SVG dashboard.
//!
//! Every renderer reads a [`RunReport`] and nothing feeds back into the
//! results. JSON and Markdown write failures are fatal for the caller (the
//! deliverable could not be produced); a chart failure is only logged.
//!
//! # Artifacts
//!
//! | File                                 | Renderer             |
//! |--------------------------------------|----------------------|
//! | `test_results_comprehensive.json`    | [`RunReport::to_json`] |
//! | `test_results_comprehensive.md`      | [`render_markdown`]  |
//! | `comprehensive_test_report.svg`      | [`render_dashboard`] |

mod chart;
pub mod console;
mod markdown;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ReportConfig;
use crate::error::{Result, SmokeError};
use crate::harness::{Grade, ResultSet, Summary};

pub use chart::render_dashboard;
pub use markdown::render_markdown;

/// JSON report file name
pub const JSON_FILE: &str = "test_results_comprehensive.json";
/// Markdown report file name
pub const MARKDOWN_FILE: &str = "test_results_comprehensive.md";
/// SVG dashboard file name
pub const CHART_FILE: &str = "comprehensive_test_report.svg";

/// Everything known about one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// Run start
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration of the run, seconds
    pub duration: f64,
    /// Aggregate counts
    pub summary: SummaryCounts,
    /// Qualitative grade
    pub grade: Grade,
    /// Outcomes grouped by category
    pub results_by_category: ResultSet,
    /// Where the run happened
    pub environment: Environment,
}

/// Aggregate counts as written to the JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCounts {
    /// All outcomes
    pub total_tests: usize,
    /// Passing outcomes
    pub passed_tests: usize,
    /// Failing outcomes
    pub failed_tests: usize,
    /// Percentage passed
    pub success_rate: f64,
}

impl From<&Summary> for SummaryCounts {
    fn from(summary: &Summary) -> Self {
        Self {
            total_tests: summary.total,
            passed_tests: summary.passed,
            failed_tests: summary.failed,
            success_rate: summary.success_rate,
        }
    }
}

/// Environment metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Version of this crate
    pub crate_version: String,
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// Working directory of the run
    pub working_directory: String,
    /// Server under test
    pub base_url: String,
}

impl Environment {
    /// Capture the current environment
    pub fn current(base_url: &str) -> Self {
        Self {
            crate_version: crate::VERSION.to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            working_directory: std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            base_url: base_url.to_string(),
        }
    }
}

impl RunReport {
    /// Build a report from a finished run
    pub fn new(results: ResultSet, started: DateTime<Utc>, duration: Duration, base_url: &str) -> Self {
        let summary = results.summary();
        Self {
            run_id: Uuid::new_v4(),
            timestamp: started,
            duration: duration.as_secs_f64(),
            summary: SummaryCounts::from(&summary),
            grade: summary.grade,
            results_by_category: results,
            environment: Environment::current(base_url),
        }
    }

    /// Summary recomputed from the outcomes
    pub fn detailed_summary(&self) -> Summary {
        self.results_by_category.summary()
    }

    /// Pretty-printed JSON; non-ASCII text is kept as-is
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON report
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Paths of the artifacts that were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPaths {
    /// JSON report
    pub json: Option<PathBuf>,
    /// Markdown report
    pub markdown: Option<PathBuf>,
    /// SVG dashboard
    pub chart: Option<PathBuf>,
}

/// Write every enabled artifact into the configured output directory.
pub fn write_all(report: &RunReport, config: &ReportConfig) -> Result<ReportPaths> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).map_err(|e| {
        SmokeError::Report(format!("Failed to create {}: {e}", dir.display()))
    })?;

    let mut paths = ReportPaths::default();

    if config.json {
        let path = dir.join(JSON_FILE);
        write_file(&path, &report.to_json()?)?;
        paths.json = Some(path);
    }

    if config.markdown {
        let path = dir.join(MARKDOWN_FILE);
        write_file(&path, &render_markdown(report))?;
        paths.markdown = Some(path);
    }

    if config.chart {
        let path = dir.join(CHART_FILE);
        match write_file(&path, &render_dashboard(report)) {
            Ok(()) => paths.chart = Some(path),
            Err(e) => tracing::warn!("Chart not written: {}", e),
        }
    }

    Ok(paths)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .map_err(|e| SmokeError::Report(format!("Failed to write {}: {e}", path.display())))?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

/// Escape text for XML/SVG content and attributes
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
