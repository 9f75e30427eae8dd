use crate::aggregate::AnalysisReport;

use super::{render_error_text, render_tables, ReportFormatter, TableDialect};

const ASCIIDOC: TableDialect = TableDialect {
    section_prefix: "===",
    error_heading: "== An error occurred",
    rule: "---------------------",
};

// AsciiDoc report formatter
pub struct AsciiDocFormatter;

impl AsciiDocFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AsciiDocFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for AsciiDocFormatter {
    fn render(&self, report: &AnalysisReport) -> String {
        render_tables(&ASCIIDOC, report)
    }

    fn render_error(&self, message: &str) -> String {
        render_error_text(&ASCIIDOC, message)
    }
}
