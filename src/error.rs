//! Error types shared across the analyzer.
//!
//! Only `SourceError` and `ConfigError` ever end a run. Parse and distribution
//! errors are per-line / per-value and are absorbed by the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain any input lines. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no files found matching '{locator}'")]
    NotFound { locator: String },

    #[error("invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("failed to open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download log: {0}")]
    Transport(String),

    #[error("failed to download log from '{url}': server answered {status}")]
    NonSuccessStatus { url: String, status: u16 },
}

/// Why a single raw line was rejected before reaching the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not follow the access-log grammar.
    #[error("line does not match the access log format")]
    MalformedLine,

    /// The grammar matched but a required field is empty or out of range.
    #[error("line contains invalid data: {0}")]
    InvalidData(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    #[error("value {value} is outside the trackable range [0, {max}]")]
    ValueOutOfRange { value: u64, max: u64 },

    #[error("invalid distribution bounds: {0}")]
    InvalidBounds(&'static str),
}

/// Invalid option combinations, detected before any input is opened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("--filter-field requires --filter-value")]
    MissingFilterValue,

    #[error("--filter-value requires --filter-field")]
    MissingFilterField,

    #[error("invalid {flag} date '{value}': expected YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS+ZZZZ or RFC 3339")]
    InvalidDate { flag: &'static str, value: String },

    #[error("--from ({from}) is after --to ({to})")]
    InvertedWindow { from: String, to: String },

    #[error("--threads must be at least 1")]
    NoWorkers,

    #[error("--top must be at least 1")]
    EmptyTop,

    #[error("--percentile must be in (0, 100], got {0}")]
    PercentileOutOfRange(f64),
}
