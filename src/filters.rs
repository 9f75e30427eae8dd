//! Record filters applied by the parse-filter stage.

use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::Serialize;

use crate::record::Record;
use crate::timestamp::format_log_timestamp;

/// Record fields that can be used with `--filter-field`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// User agent, case-insensitive
    #[value(name = "agent")]
    Agent,
    /// HTTP method, case-insensitive
    Method,
    /// Status code, exact
    Status,
    /// Requested resource, case-insensitive
    Resource,
    /// Referrer, case-insensitive
    #[value(name = "referer")]
    Referer,
    /// Authenticated user, case-insensitive
    #[value(name = "remote_user")]
    RemoteUser,
    /// Response size in bytes, exact
    Size,
}

/// A single field/value predicate, built once per run.
///
/// String fields compare case-insensitively and never match an empty field.
/// Status and size compare the exact textual value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldFilter {
    #[default]
    Any,
    UserAgent(String),
    Method(String),
    Status(String),
    Resource(String),
    Referrer(String),
    RemoteUser(String),
    ResponseSize(String),
}

impl FieldFilter {
    pub fn new(field: FilterField, value: &str) -> Self {
        let folded = value.to_lowercase();
        match field {
            FilterField::Agent => FieldFilter::UserAgent(folded),
            FilterField::Method => FieldFilter::Method(folded),
            FilterField::Status => FieldFilter::Status(value.to_string()),
            FilterField::Resource => FieldFilter::Resource(folded),
            FilterField::Referer => FieldFilter::Referrer(folded),
            FilterField::RemoteUser => FieldFilter::RemoteUser(folded),
            FilterField::Size => FieldFilter::ResponseSize(value.to_string()),
        }
    }

    pub fn from_option(selection: Option<(FilterField, &str)>) -> Self {
        selection
            .map(|(field, value)| Self::new(field, value))
            .unwrap_or_default()
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            FieldFilter::Any => true,
            FieldFilter::UserAgent(v) => folded_eq(&record.user_agent, v),
            FieldFilter::Method(v) => folded_eq(&record.method, v),
            FieldFilter::Status(v) => record.status == *v,
            FieldFilter::Resource(v) => folded_eq(&record.resource, v),
            FieldFilter::Referrer(v) => folded_eq(&record.referrer, v),
            FieldFilter::RemoteUser(v) => folded_eq(&record.remote_user, v),
            FieldFilter::ResponseSize(v) => record.response_size.to_string() == *v,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, FieldFilter::Any)
    }
}

fn folded_eq(field: &str, folded_value: &str) -> bool {
    !field.is_empty() && field.to_lowercase() == folded_value
}

/// Inclusive time window; `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeRange {
    pub from: Option<DateTime<FixedOffset>>,
    pub to: Option<DateTime<FixedOffset>>,
}

impl TimeRange {
    pub fn new(from: Option<DateTime<FixedOffset>>, to: Option<DateTime<FixedOffset>>) -> Self {
        Self { from, to }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, ts: &DateTime<FixedOffset>) -> bool {
        if let Some(from) = &self.from {
            if ts < from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if ts > to {
                return false;
            }
        }
        true
    }

    pub fn accepts(&self, record: &Record) -> bool {
        self.contains(&record.timestamp)
    }

    pub fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |bound: &Option<DateTime<FixedOffset>>| {
            bound
                .as_ref()
                .map(format_log_timestamp)
                .unwrap_or_else(|| "-".to_string())
        };
        write!(f, "[{} .. {}]", show(&self.from), show(&self.to))
    }
}
