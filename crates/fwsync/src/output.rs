//! Output formatting: table and JSON.
//!
//! Table rendering uses `tabled`; structured formats serialize the
//! report via serde so scripts see exactly what the core produced.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use fwsync_core::{BatchReport, ReconcileOutcome};

use crate::cli::OutputFormat;

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "PROJECT")]
    project: String,
    #[tabled(rename = "RULE")]
    rule: String,
    #[tabled(rename = "OUTCOME")]
    outcome: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

fn colorize(outcome: &ReconcileOutcome) -> String {
    if !io::stdout().is_terminal() || std::env::var("NO_COLOR").is_ok() {
        return outcome.label().to_owned();
    }
    match outcome {
        ReconcileOutcome::Created => outcome.label().green().to_string(),
        ReconcileOutcome::Updated => outcome.label().yellow().to_string(),
        ReconcileOutcome::Unchanged => outcome.label().dimmed().to_string(),
        ReconcileOutcome::Failed { .. } => outcome.label().red().to_string(),
    }
}

/// Render a batch report in the chosen format.
pub fn render_report(report: &BatchReport, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let rows: Vec<ReportRow> = report
                .entries
                .iter()
                .map(|entry| ReportRow {
                    project: entry.project.clone(),
                    rule: entry.rule_name.clone(),
                    outcome: colorize(&entry.outcome),
                    detail: match &entry.outcome {
                        ReconcileOutcome::Failed { reason } => reason.clone(),
                        _ => String::new(),
                    },
                })
                .collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(report, false),
        OutputFormat::JsonCompact => render_json(report, true),
    }
}

fn render_json<T: serde::Serialize>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
