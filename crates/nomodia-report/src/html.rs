//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use nomodia_core::report::{answer_label, AssessmentReport, PoolSection};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from an assessment report.
pub fn generate_html(report: &AssessmentReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Nomodia assessment {}</title>\n",
        report.session_id
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Nomodia Comprehensive Assessment</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Session <code>{}</code> | {} | {}/{} answered | started {} | generated {}</p>\n",
        report.session_id,
        html_escape(&report.status.to_string()),
        report.progress.answered,
        report.progress.total,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Readings
    html.push_str("<section class=\"readings\">\n");
    html.push_str("<h2>Results</h2>\n");
    html.push_str("<dl>\n");
    for (label, value) in [
        ("Spiral dynamics", report.interpretation.spiral.to_string()),
        ("Emotional scale", report.interpretation.emotional.to_string()),
        ("General outlook", report.interpretation.general.to_string()),
    ] {
        html.push_str(&format!(
            "<dt>{label}</dt><dd>{}</dd>\n",
            html_escape(&value)
        ));
    }
    html.push_str("</dl>\n");

    if !report.sections.is_empty() {
        html.push_str(&generate_bar_chart(&report.sections));
    }
    html.push_str("</section>\n");

    // Per-pool answers
    for section in &report.sections {
        let table_id = format!("pool-{}", section.kind);
        html.push_str(&format!("<section class=\"pool\" id=\"{table_id}-section\">\n"));
        html.push_str(&format!(
            "<h2>{} questions <span class=\"meta\">({} yes)</span></h2>\n",
            html_escape(&section.kind.to_string()),
            section.yes_count()
        ));
        html.push_str(&format!("<table id=\"{table_id}\">\n"));
        html.push_str(&format!(
            "<thead><tr><th onclick=\"sortTable('{table_id}', 0)\">#</th><th onclick=\"sortTable('{table_id}', 1)\">Question</th><th onclick=\"sortTable('{table_id}', 2)\">Answer</th></tr></thead>\n"
        ));
        html.push_str("<tbody>\n");
        for entry in &section.entries {
            let class = match entry.answer {
                Some(true) => "yes",
                Some(false) => "no",
                None => "unanswered",
            };
            html.push_str(&format!(
                "<tr class=\"{class}\"><td><span class=\"swatch\" style=\"background:{}\"></span>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&entry.color),
                entry.index + 1,
                html_escape(&entry.text),
                answer_label(entry.answer)
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AssessmentReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars showing the share of "yes" answers per pool.
fn generate_bar_chart(sections: &[PoolSection]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total_height = sections.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, section) in sections.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let share = if section.entries.is_empty() {
            0.0
        } else {
            section.yes_count() as f64 / section.entries.len() as f64
        };
        let width = (share * max_width as f64) as usize;

        let color = if share >= 0.7 {
            "#22c55e"
        } else if share >= 0.4 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&section.kind.to_string())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{} yes</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            section.yes_count(),
            section.entries.len()
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --yes: #dcfce7; --no: #fde2e2; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --yes: #064e3b; --no: #7f1d1d; --muted: #9ca3af; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); font-weight: normal; }
dl { display: grid; grid-template-columns: max-content 1fr; gap: 0.5rem 1.5rem; }
dt { font-weight: bold; }
dd { margin: 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.yes { background: var(--yes); }
.no { background: var(--no); }
.unanswered { color: var(--muted); }
.swatch { display: inline-block; width: 0.8rem; height: 0.8rem; border-radius: 50%; margin-right: 0.5rem; vertical-align: middle; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const cmp = col === 0 ? Number(va) - Number(vb) : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
