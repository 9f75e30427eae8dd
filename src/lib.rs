// Core library for the logtally access log analyzer

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod decompression;
pub mod distribution;
pub mod error;
pub mod filters;
pub mod formatters;
pub mod logging;
pub mod parallel;
pub mod parsers;
pub mod readers;
pub mod record;
pub mod stats;
pub mod timestamp;

pub use aggregate::{AnalysisReport, Aggregator, CountEntry, ReportSettings, RunningTotals};
pub use cli::Cli;
pub use config::{AnalyzerConfig, OutputFormat};
pub use distribution::ApproximateDistribution;
pub use error::{ConfigError, DistributionError, ParseError, SourceError};
pub use filters::{FieldFilter, FilterField, TimeRange};
pub use formatters::{create_formatter, ReportFormatter};
pub use parallel::{analyze_stream, run_analysis, AnalysisRun, PipelineSettings};
pub use parsers::{AccessLogParser, RecordParser};
pub use readers::{open_source, FileSource, LineSource, LineStream, UrlSource};
pub use record::{Record, SourcedLine};
