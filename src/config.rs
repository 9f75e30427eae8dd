use std::path::PathBuf;

use clap::ValueEnum;

use crate::aggregate::ReportSettings;
use crate::cli::Cli;
use crate::error::ConfigError;
use crate::filters::{FieldFilter, TimeRange};
use crate::parallel::PipelineSettings;
use crate::timestamp::{format_log_timestamp, parse_bound};

/// Validated settings for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub input: InputConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone)]
pub struct InputConfig {
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub field: FieldFilter,
    pub window: TimeRange,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: Option<PathBuf>,
    pub top: usize,
    pub percentile: f64,
    pub stats: bool,
}

#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    pub threads: usize,
    pub buffer_size: usize,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Adoc,
    Json,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            buffer_size: crate::readers::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl AnalyzerConfig {
    /// Build and validate the configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let field = match (cli.filter_field, cli.filter_value.as_deref()) {
            (Some(field), Some(value)) if !value.is_empty() => FieldFilter::new(field, value),
            (Some(_), _) => return Err(ConfigError::MissingFilterValue),
            (None, Some(_)) => return Err(ConfigError::MissingFilterField),
            (None, None) => FieldFilter::Any,
        };

        let from = parse_bound_arg("--from", cli.from.as_deref())?;
        let to = parse_bound_arg("--to", cli.to.as_deref())?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ConfigError::InvertedWindow {
                    from: format_log_timestamp(&from),
                    to: format_log_timestamp(&to),
                });
            }
        }

        if cli.threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if cli.top == 0 {
            return Err(ConfigError::EmptyTop);
        }
        if !(cli.percentile > 0.0 && cli.percentile <= 100.0) {
            return Err(ConfigError::PercentileOutOfRange(cli.percentile));
        }

        Ok(Self {
            input: InputConfig {
                locator: cli.path.clone().unwrap_or_default(),
            },
            filter: FilterConfig {
                field,
                window: TimeRange::new(from, to),
            },
            output: OutputConfig {
                format: cli.format,
                file: cli.output_file.as_ref().map(PathBuf::from),
                top: cli.top,
                percentile: cli.percentile,
                stats: cli.stats,
            },
            performance: PerformanceConfig {
                threads: cli.threads,
                buffer_size: cli.buffer_size.max(1),
            },
        })
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            top: self.output.top,
            percentile: self.output.percentile,
            window: self.filter.window,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            field_filter: self.filter.field.clone(),
            report: self.report_settings(),
            workers: self.performance.threads,
            buffer_size: self.performance.buffer_size,
        }
    }
}

fn parse_bound_arg(
    flag: &'static str,
    value: Option<&str>,
) -> Result<Option<chrono::DateTime<chrono::FixedOffset>>, ConfigError> {
    match value {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => parse_bound(text)
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidDate {
                flag,
                value: text.to_string(),
            }),
    }
}
