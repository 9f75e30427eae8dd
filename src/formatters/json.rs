use crate::aggregate::AnalysisReport;

use super::ReportFormatter;

// JSON formatter
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn render(&self, report: &AnalysisReport) -> String {
        let mut text = serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
        text.push('\n');
        text
    }

    fn render_error(&self, message: &str) -> String {
        let doc = serde_json::json!({ "error": message });
        let mut text = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string());
        text.push('\n');
        text
    }
}
