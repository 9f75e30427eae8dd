use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// First status code counted as a server error.
pub const SERVER_ERROR_FIRST: u16 = 500;
/// Last status code counted as a server error.
pub const SERVER_ERROR_LAST: u16 = 599;

/// One access-log entry that passed validation.
///
/// Records are only built by the access parser, so every instance has a
/// timestamp, a client address, a method, a resource and a status code in
/// `[100, 600)`. Optional fields are empty strings when the log carried the
/// `-` placeholder or omitted the referrer/user-agent pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub source_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub remote_addr: String,
    pub remote_user: String,
    pub method: String,
    pub resource: String,
    pub status: String,
    pub response_size: u64,
    pub referrer: String,
    pub user_agent: String,
}

impl Record {
    /// Numeric status code. The parser guarantees three ASCII digits.
    pub fn status_code(&self) -> u16 {
        self.status.parse().unwrap_or(0)
    }

    pub fn is_server_error(&self) -> bool {
        is_server_error_status(self.status_code())
    }
}

pub fn is_server_error_status(code: u16) -> bool {
    (SERVER_ERROR_FIRST..=SERVER_ERROR_LAST).contains(&code)
}

/// A raw line together with the identifier of the input it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedLine {
    pub source_id: String,
    pub line: String,
}

impl SourcedLine {
    pub fn new(source_id: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            line: line.into(),
        }
    }
}
