// Command-line interface definition

use clap::Parser;

use crate::config::OutputFormat;
use crate::filters::FilterField;

#[derive(Parser, Debug, Clone)]
#[command(name = "logtally")]
#[command(about = "Summarize web server access logs: requests, sizes, status codes, resources and referrers")]
#[command(
    long_about = "Summarize web server access logs: requests, sizes, status codes, resources and referrers\n\nThe input is a file, a glob pattern (quote it) or an http(s) URL.\nGzip and zstd compressed files are decompressed automatically."
)]
#[command(version)]
pub struct Cli {
    /// Log file, glob pattern ('logs/*.log') or http(s):// URL
    #[arg(required_unless_present = "show_config", help_heading = "Input Options")]
    pub path: Option<String>,

    /// Ignore records before this instant (YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS+ZZZZ or RFC 3339)
    #[arg(long = "from", help_heading = "Filtering Options")]
    pub from: Option<String>,

    /// Ignore records after this instant (same formats as --from)
    #[arg(long = "to", help_heading = "Filtering Options")]
    pub to: Option<String>,

    /// Keep only records whose field equals --filter-value
    #[arg(long = "filter-field", value_enum, help_heading = "Filtering Options")]
    pub filter_field: Option<FilterField>,

    /// Value compared against --filter-field (case-insensitive for text fields)
    #[arg(long = "filter-value", help_heading = "Filtering Options")]
    pub filter_value: Option<String>,

    /// Report format
    #[arg(
        short = 'F',
        long = "format",
        value_enum,
        default_value = "markdown",
        help_heading = "Output Options"
    )]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long = "output-file", help_heading = "Output Options")]
    pub output_file: Option<String>,

    /// Number of rows in each top-N table
    #[arg(long = "top", default_value_t = 3, help_heading = "Output Options")]
    pub top: usize,

    /// Response size percentile to report
    #[arg(long = "percentile", default_value_t = 95.0, help_heading = "Output Options")]
    pub percentile: f64,

    /// Print processing statistics to stderr after the report
    #[arg(long = "stats", help_heading = "Output Options")]
    pub stats: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", help_heading = "Output Options", conflicts_with = "verbose")]
    pub quiet: bool,

    /// More diagnostics on stderr (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Output Options")]
    pub verbose: u8,

    /// Aggregation worker threads
    #[arg(long = "threads", default_value_t = 8, help_heading = "Performance Options")]
    pub threads: usize,

    /// Capacity of the line and record channels
    #[arg(long = "buffer-size", default_value_t = 10_000, help_heading = "Performance Options")]
    pub buffer_size: usize,

    /// Specify custom configuration file path
    #[arg(long = "config-file", help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Ignore configuration files
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,

    /// Use alias from configuration file
    #[arg(short = 'a', long = "alias", help_heading = "Configuration Options")]
    pub alias: Vec<String>,

    /// Show configuration file and exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,
}

/// Value of `--config-file` in raw arguments, before clap runs.
pub fn extract_config_file_arg(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config-file" {
            return iter.next().cloned();
        }
        if let Some(value) = arg.strip_prefix("--config-file=") {
            return Some(value.to_string());
        }
    }
    None
}
