use once_cell::sync::Lazy;
use regex::Regex;

use super::RecordParser;
use crate::error::ParseError;
use crate::record::Record;
use crate::timestamp::parse_log_timestamp;

/// Separator between the source identifier and the log line in tagged input.
pub const SOURCE_SEPARATOR: char = '$';

const PLACEHOLDER: &str = "-";

// Access log line (nginx/Apache combined, referrer/user-agent pair optional)
// Example: 127.0.0.1 - admin [10/Oct/2023:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 1234 "http://example.com" "Mozilla/5.0"
// Trailing fields after the user agent (request time, upstream info) are ignored.
static ACCESS_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(\S+) (\S+) (\S+) \[(.*?)\] "(\S+) (\S+) \S+" ([0-9]{3}) ([0-9]+)(?: "(.*?)" "(.*?)")?"#,
    )
    .expect("failed to compile access log regex")
});

/// Parser for the single supported access-log grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessLogParser;

impl AccessLogParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a line in `<source>$<access log line>` form.
    ///
    /// Exactly one `$` is allowed. Lines with none or several are malformed.
    pub fn parse_tagged(&self, tagged: &str) -> Result<Record, ParseError> {
        if tagged.matches(SOURCE_SEPARATOR).count() != 1 {
            return Err(ParseError::MalformedLine);
        }
        let (source_id, line) = tagged
            .split_once(SOURCE_SEPARATOR)
            .ok_or(ParseError::MalformedLine)?;
        self.parse(source_id, line)
    }

    fn required_field(value: &str) -> &str {
        if value == PLACEHOLDER {
            ""
        } else {
            value
        }
    }

    fn optional_field(value: Option<regex::Match<'_>>) -> String {
        match value.map(|m| m.as_str()) {
            Some(v) if !v.is_empty() && v != PLACEHOLDER => v.to_string(),
            _ => String::new(),
        }
    }
}

impl RecordParser for AccessLogParser {
    fn parse(&self, source_id: &str, line: &str) -> Result<Record, ParseError> {
        let line = line.trim_end_matches('\n').trim_end_matches('\r');
        let captures = ACCESS_LINE_REGEX
            .captures(line)
            .ok_or(ParseError::MalformedLine)?;

        let remote_addr = Self::required_field(&captures[1]);
        let remote_user = Self::required_field(&captures[3]);
        let timestamp = parse_log_timestamp(&captures[4]);
        let method = &captures[5];
        let resource = &captures[6];
        let status = Self::required_field(&captures[7]);
        // Digits only, so the only failure left is overflow.
        let response_size = captures[8].parse::<u64>().unwrap_or(0);

        if remote_addr.is_empty() {
            return Err(ParseError::InvalidData("missing client address"));
        }
        let Some(timestamp) = timestamp else {
            return Err(ParseError::InvalidData("unparseable timestamp"));
        };
        if method.is_empty() || resource.is_empty() || status.is_empty() {
            return Err(ParseError::InvalidData("missing request fields"));
        }
        match status.parse::<u16>() {
            Ok(code) if (100..600).contains(&code) => {}
            _ => return Err(ParseError::InvalidData("status code out of range")),
        }

        Ok(Record {
            source_id: source_id.to_string(),
            timestamp,
            remote_addr: remote_addr.to_string(),
            remote_user: remote_user.to_string(),
            method: method.to_string(),
            resource: resource.to_string(),
            status: status.to_string(),
            response_size,
            referrer: Self::optional_field(captures.get(9)),
            user_agent: Self::optional_field(captures.get(10)),
        })
    }
}
