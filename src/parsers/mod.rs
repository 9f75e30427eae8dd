pub mod access;

pub use access::AccessLogParser;

use crate::error::ParseError;
use crate::record::Record;

/// Turns one raw line from a known source into a validated [`Record`].
pub trait RecordParser: Send + Sync {
    fn parse(&self, source_id: &str, line: &str) -> Result<Record, ParseError>;
}
