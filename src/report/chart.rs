//! SVG dashboard: five panels on a dark background.
//!
//! ```text
//! +----------------------+----------------------+
//! | success rate by      | passed vs failed     |
//! | category (bars)      | (pie)                |
//! +----------------------+----------------------+
//! | duration per test    | category radar       |
//! | (horizontal bars)    |                      |
//! +----------------------+----------------------+
//! | duration heatmap (one cell per test)        |
//! +---------------------------------------------+
//! ```

use std::f64::consts::PI;
use std::fmt::Write as _;

use crate::harness::CategorySummary;

use super::{escape_xml, RunReport};

const WIDTH: f64 = 1600.0;
const PANEL_W: f64 = WIDTH / 2.0;
const PANEL_H: f64 = 600.0;
const HEATMAP_H: f64 = 360.0;
const HEIGHT: f64 = PANEL_H * 2.0 + HEATMAP_H;
const HEATMAP_COLUMNS: usize = 11;

const BACKGROUND: &str = "#0a0a0a";
const PANEL: &str = "#141414";
const GRID: &str = "#333333";
const TEXT: &str = "#e5e5e5";
const GREEN: &str = "#4ade80";
const AMBER: &str = "#fbbf24";
const RED: &str = "#ef4444";
const BLUE: &str = "#60a5fa";

/// Yellow-orange-red ramp, fastest to slowest
const HEAT_STOPS: [(u8, u8, u8); 3] = [(0xff, 0xff, 0xb2), (0xfd, 0x8d, 0x3c), (0xbd, 0x00, 0x26)];

const NAME_CHARS: usize = 20;

/// Bar colour for a success rate
fn rate_color(rate: f64) -> &'static str {
    if rate >= 90.0 {
        GREEN
    } else if rate >= 70.0 {
        AMBER
    } else {
        RED
    }
}

fn short_name(name: &str) -> String {
    if name.chars().count() > NAME_CHARS {
        let head: String = name.chars().take(NAME_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Render the dashboard as a standalone SVG document.
pub fn render_dashboard(report: &RunReport) -> String {
    let summary = report.detailed_summary();
    let mut svg = String::new();

    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">"
    );
    svg.push_str("  <style>\n");
    let _ = writeln!(
        svg,
        "    text {{ font-family: sans-serif; fill: {TEXT}; }}\n    .title {{ font-size: 20px; font-weight: bold; }}\n    .label {{ font-size: 12px; }}"
    );
    svg.push_str("  </style>\n");
    let _ = writeln!(svg, "  <rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND}\"/>");

    for (x, y) in [(0.0, 0.0), (PANEL_W, 0.0), (0.0, PANEL_H), (PANEL_W, PANEL_H)] {
        let _ = writeln!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"8\" fill=\"{PANEL}\"/>",
            x + 10.0,
            y + 10.0,
            PANEL_W - 20.0,
            PANEL_H - 20.0
        );
    }
    let _ = writeln!(
        svg,
        "  <rect x=\"10.0\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"8\" fill=\"{PANEL}\"/>",
        PANEL_H * 2.0 + 10.0,
        WIDTH - 20.0,
        HEATMAP_H - 20.0
    );

    category_bars(&mut svg, &summary.categories);
    pass_fail_pie(&mut svg, summary.passed, summary.failed);
    duration_bars(&mut svg, report);
    category_radar(&mut svg, &summary.categories);
    duration_heatmap(&mut svg, report);

    svg.push_str("</svg>\n");
    svg
}

fn panel_title(svg: &mut String, x: f64, y: f64, title: &str) {
    let _ = writeln!(
        svg,
        "  <text class=\"title\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{title}</text>",
        x + PANEL_W / 2.0,
        y + 45.0
    );
}

fn placeholder(svg: &mut String, x: f64, y: f64, message: &str) {
    let _ = writeln!(
        svg,
        "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{message}</text>",
        x,
        y
    );
}

fn category_bars(svg: &mut String, categories: &[CategorySummary]) {
    panel_title(svg, 0.0, 0.0, "Success Rate by Category");

    let (left, top, width, height) = (80.0, 80.0, 680.0, 420.0);
    let bottom = top + height;

    for pct in [0.0, 25.0, 50.0, 75.0, 100.0] {
        let y = bottom - height * pct / 100.0;
        let _ = writeln!(
            svg,
            "  <line x1=\"{left:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{GRID}\"/>",
            left + width
        );
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{pct:.0}%</text>",
            left - 8.0,
            y + 4.0
        );
    }

    if categories.is_empty() {
        placeholder(svg, left + width / 2.0, top + height / 2.0, "No results");
        return;
    }

    let slot = width / categories.len() as f64;
    let bar_w = slot * 0.6;
    for (i, category) in categories.iter().enumerate() {
        let x = left + slot * i as f64 + (slot - bar_w) / 2.0;
        let bar_h = height * category.success_rate / 100.0;
        let _ = writeln!(
            svg,
            "  <rect class=\"bar\" x=\"{x:.1}\" y=\"{:.1}\" width=\"{bar_w:.1}\" height=\"{bar_h:.1}\" fill=\"{}\"/>",
            bottom - bar_h,
            rate_color(category.success_rate)
        );
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{:.1}%</text>",
            x + bar_w / 2.0,
            bottom - bar_h - 6.0,
            category.success_rate
        );
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            x + bar_w / 2.0,
            bottom + 20.0,
            escape_xml(&category.category.title())
        );
    }
}

fn pass_fail_pie(svg: &mut String, passed: usize, failed: usize) {
    panel_title(svg, PANEL_W, 0.0, "Passed vs Failed");

    let (cx, cy, r) = (PANEL_W + PANEL_W / 2.0, 320.0, 200.0);
    let total = passed + failed;

    if total == 0 {
        let _ = writeln!(svg, "  <circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{r:.1}\" fill=\"{GRID}\"/>");
        placeholder(svg, cx, cy, "No tests");
        return;
    }

    if passed == 0 || failed == 0 {
        let color = if failed == 0 { GREEN } else { RED };
        let _ = writeln!(
            svg,
            "  <circle class=\"slice\" cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{r:.1}\" fill=\"{color}\"/>"
        );
    } else {
        let fraction = passed as f64 / total as f64;
        let start = -PI / 2.0;
        let split = start + fraction * 2.0 * PI;
        let point = |angle: f64| (cx + r * angle.cos(), cy + r * angle.sin());
        let (x0, y0) = point(start);
        let (x1, y1) = point(split);

        for (color, large, from, to) in [
            (GREEN, u8::from(fraction > 0.5), (x0, y0), (x1, y1)),
            (RED, u8::from(fraction < 0.5), (x1, y1), (x0, y0)),
        ] {
            let _ = writeln!(
                svg,
                "  <path class=\"slice\" d=\"M {cx:.1} {cy:.1} L {:.1} {:.1} A {r:.1} {r:.1} 0 {large} 1 {:.1} {:.1} Z\" fill=\"{color}\"/>",
                from.0, from.1, to.0, to.1
            );
        }
    }

    let pct = |n: usize| n as f64 * 100.0 / total as f64;
    let _ = writeln!(
        svg,
        "  <text class=\"label\" x=\"{cx:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Passed {passed} ({:.1}%) / Failed {failed} ({:.1}%)</text>",
        cy + r + 40.0,
        pct(passed),
        pct(failed)
    );
}

fn duration_bars(svg: &mut String, report: &RunReport) {
    panel_title(svg, 0.0, PANEL_H, "Duration per Test");

    let outcomes: Vec<_> = report.results_by_category.outcomes().collect();
    let (left, top, width, height) = (190.0, PANEL_H + 80.0, 520.0, 460.0);

    if outcomes.is_empty() {
        placeholder(svg, left + width / 2.0, top + height / 2.0, "No results");
        return;
    }

    let longest = outcomes
        .iter()
        .map(|o| o.duration.as_secs_f64())
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let row = (height / outcomes.len() as f64).min(24.0);

    for (i, outcome) in outcomes.iter().enumerate() {
        let secs = outcome.duration.as_secs_f64();
        let y = top + row * i as f64;
        let bar_w = width * secs / longest;
        let color = if outcome.success { BLUE } else { RED };
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>",
            left - 8.0,
            y + row * 0.7,
            escape_xml(&short_name(&outcome.name))
        );
        let _ = writeln!(
            svg,
            "  <rect class=\"duration\" x=\"{left:.1}\" y=\"{:.1}\" width=\"{bar_w:.1}\" height=\"{:.1}\" fill=\"{color}\"/>",
            y + row * 0.15,
            row * 0.7
        );
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\">{secs:.2}s</text>",
            left + bar_w + 6.0,
            y + row * 0.7
        );
    }
}

fn category_radar(svg: &mut String, categories: &[CategorySummary]) {
    panel_title(svg, PANEL_W, PANEL_H, "Category Radar");

    let (cx, cy, r) = (PANEL_W + PANEL_W / 2.0, PANEL_H + 330.0, 200.0);
    if categories.len() < 3 {
        placeholder(svg, cx, cy, "Radar needs at least 3 categories");
        return;
    }

    let n = categories.len();
    let angle = |i: usize| -PI / 2.0 + 2.0 * PI * i as f64 / n as f64;
    let polygon = |scale: &dyn Fn(usize) -> f64| -> String {
        (0..n)
            .map(|i| {
                let (a, s) = (angle(i), scale(i));
                format!("{:.1},{:.1}", cx + r * s * a.cos(), cy + r * s * a.sin())
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    for ring in [0.25, 0.5, 0.75, 1.0] {
        let _ = writeln!(
            svg,
            "  <polygon points=\"{}\" fill=\"none\" stroke=\"{GRID}\"/>",
            polygon(&|_| ring)
        );
    }

    for (i, category) in categories.iter().enumerate() {
        let a = angle(i);
        let _ = writeln!(
            svg,
            "  <line x1=\"{cx:.1}\" y1=\"{cy:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{GRID}\"/>",
            cx + r * a.cos(),
            cy + r * a.sin()
        );
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            cx + (r + 30.0) * a.cos(),
            cy + (r + 30.0) * a.sin() + 4.0,
            escape_xml(&category.category.title())
        );
    }

    let _ = writeln!(
        svg,
        "  <polygon class=\"radar\" points=\"{}\" fill=\"{GREEN}\" fill-opacity=\"0.25\" stroke=\"{GREEN}\" stroke-width=\"2\"/>",
        polygon(&|i| categories[i].success_rate / 100.0)
    );
}

/// Ramp colour for `fraction` in 0..=1
fn heat_color(fraction: f64) -> String {
    let t = fraction.clamp(0.0, 1.0) * (HEAT_STOPS.len() - 1) as f64;
    let lower = (t.floor() as usize).min(HEAT_STOPS.len() - 2);
    let local = t - lower as f64;
    let (a, b) = (HEAT_STOPS[lower], HEAT_STOPS[lower + 1]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * local).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn duration_heatmap(svg: &mut String, report: &RunReport) {
    let top = PANEL_H * 2.0;
    let _ = writeln!(
        svg,
        "  <text class=\"title\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Test Execution Time</text>",
        WIDTH / 2.0,
        top + 45.0
    );

    let outcomes: Vec<_> = report.results_by_category.outcomes().collect();
    let (left, grid_top, width, height) = (40.0, top + 70.0, WIDTH - 80.0, HEATMAP_H - 130.0);
    if outcomes.is_empty() {
        placeholder(svg, WIDTH / 2.0, grid_top + height / 2.0, "No results");
        return;
    }

    let longest = outcomes
        .iter()
        .map(|o| o.duration.as_secs_f64())
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let rows = outcomes.len().div_ceil(HEATMAP_COLUMNS);
    let cell_w = width / HEATMAP_COLUMNS as f64;
    let cell_h = (height / rows as f64).min(80.0);

    for (i, outcome) in outcomes.iter().enumerate() {
        let secs = outcome.duration.as_secs_f64();
        let x = left + cell_w * (i % HEATMAP_COLUMNS) as f64;
        let y = grid_top + cell_h * (i / HEATMAP_COLUMNS) as f64;
        let _ = writeln!(
            svg,
            "  <rect class=\"heat\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
            cell_w - 4.0,
            cell_h - 4.0,
            heat_color(secs / longest)
        );
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" style=\"fill: {BACKGROUND}\">{}</text>",
            x + cell_w / 2.0,
            y + cell_h / 2.0 - 4.0,
            escape_xml(&short_name(&outcome.name))
        );
        let _ = writeln!(
            svg,
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" style=\"fill: {BACKGROUND}\">{secs:.2}s</text>",
            x + cell_w / 2.0,
            y + cell_h / 2.0 + 12.0
        );
    }

    let _ = writeln!(
        svg,
        "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">0.00s (yellow) to {longest:.2}s (red)</text>",
        WIDTH / 2.0,
        top + HEATMAP_H - 30.0
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::harness::{Category, Check, ResultSet, TestOutcome};
    use crate::report::fixtures::sample_report;

    fn report_with(categories: &[(&'static str, bool)]) -> RunReport {
        let mut results = ResultSet::new();
        for (i, (category, ok)) in categories.iter().enumerate() {
            let check = if *ok { Check::pass("ok") } else { Check::fail("no") };
            results.push(
                &Category::from(*category),
                TestOutcome::from_check(format!("case {i}"), check, Duration::from_millis(100)),
            );
        }
        RunReport::new(results, Utc::now(), Duration::from_secs(1), "http://localhost:11434")
    }

    #[test]
    fn test_rate_color_thresholds() {
        assert_eq!(rate_color(100.0), GREEN);
        assert_eq!(rate_color(90.0), GREEN);
        assert_eq!(rate_color(89.9), AMBER);
        assert_eq!(rate_color(70.0), AMBER);
        assert_eq!(rate_color(69.9), RED);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Ollama Connectivity"), "Ollama Connectivity");
        assert_eq!(short_name("Mathematical Reasoning"), "Mathematical Reasoni...");
        assert_eq!(short_name("日本語日本語日本語日本語日本語日本語日本語"), "日本語日本語日本語日本語日本語日本語日本...");
    }

    #[test]
    fn test_dashboard_structure() {
        let svg = render_dashboard(&sample_report());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(BACKGROUND));
        assert_eq!(svg.matches("class=\"bar\"").count(), 2);
        assert_eq!(svg.matches("class=\"duration\"").count(), 3);
        assert_eq!(svg.matches("class=\"slice\"").count(), 2);
        assert!(svg.contains("Code &lt;Generation&gt;"));
        assert!(!svg.contains("Code <Generation>"));
        // two categories: no radar polygon
        assert!(svg.contains("Radar needs at least 3 categories"));
        assert_eq!(svg.matches("class=\"heat\"").count(), 3);
    }

    #[test]
    fn test_heat_color_ramp() {
        assert_eq!(heat_color(0.0), "#ffffb2");
        assert_eq!(heat_color(0.5), "#fd8d3c");
        assert_eq!(heat_color(1.0), "#bd0026");
        assert_eq!(heat_color(2.0), "#bd0026");
        assert_eq!(heat_color(-1.0), "#ffffb2");
    }

    #[test]
    fn test_heatmap_slowest_cell_is_red() {
        let mut results = ResultSet::new();
        for (name, millis) in [("fast", 100), ("slow", 400)] {
            results.push(
                &Category::INFRASTRUCTURE,
                TestOutcome::from_check(name, Check::pass("ok"), Duration::from_millis(millis)),
            );
        }
        let report = RunReport::new(results, Utc::now(), Duration::from_secs(1), "http://localhost:11434");

        let svg = render_dashboard(&report);
        assert_eq!(svg.matches("class=\"heat\"").count(), 2);
        assert!(svg.contains("fill=\"#bd0026\""));
        assert!(svg.contains("0.00s (yellow) to 0.40s (red)"));
    }

    #[test]
    fn test_all_passed_pie_is_single_circle() {
        let svg = render_dashboard(&report_with(&[("a", true), ("b", true), ("c", true)]));
        assert_eq!(svg.matches("<circle class=\"slice\"").count(), 1);
        assert!(svg.contains(&format!("r=\"200.0\" fill=\"{GREEN}\"")));
        assert!(svg.contains("class=\"radar\""));
    }

    #[test]
    fn test_empty_report_renders() {
        let svg = render_dashboard(&report_with(&[]));
        assert!(svg.contains("No tests"));
        assert_eq!(svg.matches("No results").count(), 3);
    }
}
