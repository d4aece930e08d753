//! Markdown rendering of a run report.

use std::fmt::Write as _;

use super::RunReport;

/// Render the Markdown report.
pub fn render_markdown(report: &RunReport) -> String {
    let summary = report.detailed_summary();
    let mut md = String::new();

    let _ = writeln!(md, "# Inference Server Test Report\n");
    let _ = writeln!(md, "**Run ID**: `{}`  ", report.run_id);
    let _ = writeln!(
        md,
        "**Executed**: {}  ",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(md, "**Duration**: {:.1}s  ", report.duration);
    let _ = writeln!(md, "**Server**: {}\n", report.environment.base_url);

    let _ = writeln!(md, "## Summary\n");
    let _ = writeln!(md, "| Metric | Value |");
    let _ = writeln!(md, "|--------|-------|");
    let _ = writeln!(md, "| Total tests | {} |", summary.total);
    let _ = writeln!(md, "| Passed | {} ✅ |", summary.passed);
    let _ = writeln!(md, "| Failed | {} ❌ |", summary.failed);
    let _ = writeln!(md, "| Success rate | {:.1}% |", summary.success_rate);
    let _ = writeln!(md, "\n## Results by Category\n");
    let _ = writeln!(md, "| Category | Passed | Total | Rate | Status |");
    let _ = writeln!(md, "|----------|--------|-------|------|--------|");
    for category in &summary.categories {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {:.1}% | {} |",
            table_cell(&category.category.title()),
            category.passed,
            category.total,
            category.success_rate,
            category.status_icon()
        );
    }

    let _ = writeln!(md, "\n## Details");
    for (category, outcomes) in report.results_by_category.categories() {
        let rate = summary
            .categories
            .iter()
            .find(|c| &c.category == category)
            .map_or(0.0, |c| c.success_rate);
        let _ = writeln!(md, "\n### {} ({rate:.1}%)\n", single_line(&category.title()));
        for outcome in outcomes {
            let icon = if outcome.success { "✅" } else { "❌" };
            let _ = writeln!(
                md,
                "- {icon} **{}** ({:.2}s)\n  - {}",
                single_line(&outcome.name),
                outcome.duration.as_secs_f64(),
                single_line(&outcome.message)
            );
        }
    }

    let _ = writeln!(md, "\n## Grade\n");
    let _ = writeln!(
        md,
        "{} **{}**: {}",
        summary.grade.icon(),
        summary.grade.label().to_uppercase(),
        summary.grade.description()
    );

    let _ = writeln!(md, "\n## Environment\n");
    let env = &report.environment;
    let _ = writeln!(md, "- Version: {}", env.crate_version);
    let _ = writeln!(md, "- Platform: {} ({})", env.os, env.arch);
    let _ = writeln!(md, "- Working directory: `{}`", env.working_directory);

    md
}

/// Collapse line breaks so text stays inside one list item or heading.
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape pipes so text stays inside one table cell.
fn table_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}
