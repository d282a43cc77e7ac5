//! The `nomodia results` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use comfy_table::{Cell, Table};

use nomodia_core::report::AssessmentReport;

use super::{open_engine, GlobalArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Text,
    #[value(alias = "md")]
    Markdown,
    Json,
    Html,
}

pub fn execute(global: &GlobalArgs, format: ReportFormat, output: Option<PathBuf>) -> Result<()> {
    let (_, engine) = open_engine(global)?;
    let report = AssessmentReport::from_session(engine.session());

    if let Some(path) = output {
        match format {
            ReportFormat::Json => report.save_json(&path)?,
            ReportFormat::Html => nomodia_report::write_html_report(&report, &path)?,
            ReportFormat::Text | ReportFormat::Markdown => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, render(&report, format)?)
                    .with_context(|| format!("failed to write report to {}", path.display()))?;
            }
        }
        println!("Report written to {}", path.display());
        return Ok(());
    }

    print!("{}", render(&report, format)?);
    if matches!(format, ReportFormat::Text) {
        println!("\n{}", pool_table(&report));
    }
    Ok(())
}

fn render(report: &AssessmentReport, format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Text => report.to_text(),
        ReportFormat::Markdown => report.to_markdown(),
        ReportFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
        ReportFormat::Html => nomodia_report::generate_html(report),
    })
}

fn pool_table(report: &AssessmentReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Pool", "Questions", "Answered", "Yes", "No"]);

    for section in &report.sections {
        let answered = section.entries.iter().filter(|e| e.answer.is_some()).count();
        let yes = section.yes_count();
        table.add_row(vec![
            Cell::new(section.kind),
            Cell::new(section.entries.len()),
            Cell::new(answered),
            Cell::new(yes),
            Cell::new(answered - yes),
        ]);
    }

    table
}
