//! Report rendering.
//!
//! Markdown and AsciiDoc share one table layout and differ only in their
//! markup; JSON serializes the report as-is.

mod adoc;
mod json;
mod markdown;

pub use adoc::AsciiDocFormatter;
pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;

use crate::aggregate::{AnalysisReport, CountEntry};
use crate::config::OutputFormat;
use crate::timestamp::format_log_timestamp;

const COLUMN_WIDTH: usize = 21;
const UNSET: &str = "-";

pub trait ReportFormatter: Send + Sync {
    /// Render a finished report.
    fn render(&self, report: &AnalysisReport) -> String;

    /// Render the document written instead of a report when the run failed.
    fn render_error(&self, message: &str) -> String;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new()),
        OutputFormat::Adoc => Box::new(AsciiDocFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

/// Markup differences between the two table-based formats.
pub(crate) struct TableDialect {
    pub section_prefix: &'static str,
    pub error_heading: &'static str,
    pub rule: &'static str,
}

/// `| label                 |                 value |`
pub(crate) fn table_row(label: &str, value: impl std::fmt::Display) -> String {
    format!(
        "| {:<width$} | {:>width$} |",
        label,
        value.to_string(),
        width = COLUMN_WIDTH
    )
}

pub(crate) fn percentile_label(rank: f64) -> String {
    if rank.fract() == 0.0 {
        format!("p{:.0} Response Size", rank)
    } else {
        format!("p{} Response Size", rank)
    }
}

pub(crate) fn render_tables(dialect: &TableDialect, report: &AnalysisReport) -> String {
    let mut out = Vec::new();
    let mut section = |title: &str, columns: (&str, &str), rows: Vec<String>| {
        out.push(format!("{} {}", dialect.section_prefix, title));
        out.push(String::new());
        out.push(table_row(columns.0, columns.1));
        out.push(table_row(dialect.rule, dialect.rule));
        out.extend(rows);
        out.push(String::new());
    };

    let date = |bound: &Option<chrono::DateTime<chrono::FixedOffset>>| {
        bound
            .as_ref()
            .map(format_log_timestamp)
            .unwrap_or_else(|| UNSET.to_string())
    };

    let mut general = vec![table_row("Number of Sources", report.source_count())];
    general.extend(report.sources.iter().map(|s| table_row("- Source", s)));
    general.push(table_row("Start Date", date(&report.from)));
    general.push(table_row("End Date", date(&report.to)));
    general.push(table_row("Total Requests", report.total_requests));
    general.push(table_row("Average Response Size", report.average_response_size));
    general.push(table_row(
        &percentile_label(report.percentile_rank),
        report.percentile_response_size,
    ));
    section("General Information", ("Metric", "Value"), general);

    section(
        "Requested Resources",
        ("Resource", "Count"),
        count_rows(&report.top_resources),
    );
    section(
        "Response Codes",
        ("Code", "Count"),
        count_rows(&report.top_status_codes),
    );
    section(
        "Additional Metrics",
        ("Metric", "Value"),
        vec![table_row("Server Errors (5xx)", report.server_errors)],
    );
    section(
        "Referrers",
        ("Referrer", "Count"),
        count_rows(&report.top_referrers),
    );

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn count_rows(entries: &[CountEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| table_row(&entry.label, entry.count))
        .collect()
}

pub(crate) fn render_error_text(dialect: &TableDialect, message: &str) -> String {
    format!("{}\n\n{}\n", dialect.error_heading, message)
}
