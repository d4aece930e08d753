//! Console output: live progress and the final summary.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::harness::{CaseEvent, Category};

use super::RunReport;

/// Icon printed in front of a category heading
pub fn category_icon(category: &Category) -> &'static str {
    match category.as_str() {
        "infrastructure" => "🏗️",
        "functionality" => "⚙️",
        "performance" => "⚡",
        "security" => "🛡️",
        "usability" => "👤",
        "reliability" => "🔄",
        "compatibility" => "📱",
        _ => "🧪",
    }
}

/// Run banner
pub fn render_header(base_url: &str, started: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🚀 ChirAI inference server test suite");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Server:  {base_url}");
    let _ = writeln!(out, "Started: {}", started.format("%Y-%m-%d %H:%M:%S UTC"));
    out
}

/// Progress line(s) for one harness event.
///
/// `last_category` tracks section changes so a heading is printed once per
/// category.
pub fn render_event(event: &CaseEvent<'_>, last_category: &mut Option<Category>) -> String {
    let mut out = String::new();
    match event {
        CaseEvent::Started {
            index,
            category,
            name,
            ..
        } => {
            if last_category.as_ref() != Some(*category) {
                let _ = writeln!(
                    out,
                    "\n{}  {} TESTS",
                    category_icon(category),
                    category.as_str().to_uppercase()
                );
                let _ = writeln!(out, "{}", "-".repeat(40));
                *last_category = Some((*category).clone());
            }
            let _ = writeln!(out, "🧪 [{index:2}] {name}");
        },
        CaseEvent::Finished { outcome, .. } => {
            let verdict = if outcome.success {
                "✅ PASS"
            } else {
                "❌ FAIL"
            };
            let _ = writeln!(
                out,
                "{verdict} ({:.2}s) - {}",
                outcome.duration.as_secs_f64(),
                outcome.message
            );
        },
    }
    out
}

/// Observer printing progress to stdout, for [`Harness::on_event`](crate::harness::Harness::on_event)
pub fn progress_printer() -> impl FnMut(&CaseEvent<'_>) + Send + 'static {
    let mut last_category = None;
    move |event| print!("{}", render_event(event, &mut last_category))
}

/// Final summary block
pub fn render_summary(report: &RunReport) -> String {
    let summary = report.detailed_summary();
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", "=".repeat(60));
    let _ = writeln!(out, "📊 Test report");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Duration:     {:.1}s", report.duration);
    let _ = writeln!(out, "Total tests:  {}", summary.total);
    let _ = writeln!(out, "Passed:       {}", summary.passed);
    let _ = writeln!(out, "Failed:       {}", summary.failed);
    let _ = writeln!(out, "Success rate: {:.1}%", summary.success_rate);

    let _ = writeln!(out, "\nBy category:");
    for category in &summary.categories {
        let _ = writeln!(
            out,
            "  {} {}: {}/{} ({:.1}%)",
            category.status_icon(),
            category.category.as_str().to_uppercase(),
            category.passed,
            category.total,
            category.success_rate
        );
    }

    let _ = writeln!(out, "\nQuality grade:");
    let _ = writeln!(
        out,
        "{} {} - {}",
        summary.grade.icon(),
        summary.grade.label().to_uppercase(),
        summary.grade.description()
    );
    out
}
