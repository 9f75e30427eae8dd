use crate::aggregate::AnalysisReport;

use super::{render_error_text, render_tables, ReportFormatter, TableDialect};

const MARKDOWN: TableDialect = TableDialect {
    section_prefix: "####",
    error_heading: "### An error occurred",
    rule: "---",
};

// Markdown report formatter
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn render(&self, report: &AnalysisReport) -> String {
        render_tables(&MARKDOWN, report)
    }

    fn render_error(&self, message: &str) -> String {
        render_error_text(&MARKDOWN, message)
    }
}
