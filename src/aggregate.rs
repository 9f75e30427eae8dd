//! Running aggregate shared by the worker pool and its one-shot finalization.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, FixedOffset};
use indexmap::IndexSet;
use serde::Serialize;

use crate::distribution::ApproximateDistribution;
use crate::error::DistributionError;
use crate::filters::TimeRange;
use crate::record::{is_server_error_status, Record};

/// Mutable totals accumulated while records are flowing.
///
/// Only reachable through [`Aggregator`] during a run. [`RunningTotals::finalize`]
/// consumes the value, so a finished aggregate can never be finalized twice.
#[derive(Debug, Clone)]
pub struct RunningTotals {
    total_requests: u64,
    total_response_size: u64,
    server_errors: u64,
    resources: HashMap<String, u64>,
    status_codes: HashMap<String, u64>,
    referrers: HashMap<String, u64>,
    distribution: ApproximateDistribution,
    sources: IndexSet<String>,
}

impl Default for RunningTotals {
    fn default() -> Self {
        Self::with_distribution(ApproximateDistribution::for_response_sizes())
    }
}

impl RunningTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_distribution(distribution: ApproximateDistribution) -> Self {
        Self {
            total_requests: 0,
            total_response_size: 0,
            server_errors: 0,
            resources: HashMap::new(),
            status_codes: HashMap::new(),
            referrers: HashMap::new(),
            distribution,
            sources: IndexSet::new(),
        }
    }

    /// Fold one accepted record into the totals.
    ///
    /// Every counter is updated even when the response size does not fit the
    /// distribution; that case is reported back to the caller and only the
    /// distribution misses the value.
    pub fn apply(&mut self, record: &Record) -> Result<(), DistributionError> {
        self.total_requests += 1;
        self.total_response_size = self.total_response_size.saturating_add(record.response_size);

        *self.status_codes.entry(record.status.clone()).or_insert(0) += 1;
        if is_server_error_status(record.status_code()) {
            self.server_errors += 1;
        }

        if !record.referrer.is_empty() {
            *self.referrers.entry(record.referrer.clone()).or_insert(0) += 1;
        }

        *self.resources.entry(record.resource.clone()).or_insert(0) += 1;

        let recorded = self.distribution.record(record.response_size);

        if !self.sources.contains(&record.source_id) {
            self.sources.insert(record.source_id.clone());
        }

        recorded
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn total_response_size(&self) -> u64 {
        self.total_response_size
    }

    pub fn server_errors(&self) -> u64 {
        self.server_errors
    }

    pub fn status_codes(&self) -> &HashMap<String, u64> {
        &self.status_codes
    }

    pub fn distribution(&self) -> &ApproximateDistribution {
        &self.distribution
    }

    pub fn sources(&self) -> &IndexSet<String> {
        &self.sources
    }

    /// Produce the report: average, percentile and top-N projections.
    pub fn finalize(self, settings: &ReportSettings) -> AnalysisReport {
        let average_response_size = if self.total_requests == 0 {
            0.0
        } else {
            self.total_response_size as f64 / self.total_requests as f64
        };

        AnalysisReport {
            sources: self.sources.into_iter().collect(),
            from: settings.window.from,
            to: settings.window.to,
            total_requests: self.total_requests,
            total_response_size: self.total_response_size,
            average_response_size,
            percentile_rank: settings.percentile,
            percentile_response_size: self.distribution.percentile(settings.percentile),
            server_errors: self.server_errors,
            top_resources: top_n(self.resources, settings.top),
            top_status_codes: top_n(self.status_codes, settings.top),
            top_referrers: top_n(self.referrers, settings.top),
        }
    }
}

/// Shared writer of the running totals.
///
/// A single lock covers the whole aggregate, so each record is applied as one
/// unit and concurrent workers never observe a half-updated state.
#[derive(Debug, Default)]
pub struct Aggregator {
    totals: Mutex<RunningTotals>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consume(&self, record: &Record) -> Result<(), DistributionError> {
        self.lock_totals().apply(record)
    }

    /// Copy of the totals as they stand, for progress inspection.
    pub fn snapshot(&self) -> RunningTotals {
        self.lock_totals().clone()
    }

    /// Release the totals once every worker has been joined.
    pub fn into_totals(self) -> RunningTotals {
        match self.totals.into_inner() {
            Ok(totals) => totals,
            Err(poisoned) => {
                tracing::warn!("aggregation worker panicked, recovering running totals");
                poisoned.into_inner()
            }
        }
    }

    fn lock_totals(&self) -> MutexGuard<'_, RunningTotals> {
        match self.totals.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("aggregation worker panicked, recovering running totals");
                poisoned.into_inner()
            }
        }
    }
}

/// Finalization parameters supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSettings {
    pub top: usize,
    pub percentile: f64,
    pub window: TimeRange,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top: 3,
            percentile: 95.0,
            window: TimeRange::unbounded(),
        }
    }
}

/// One row of a top-N table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

impl CountEntry {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Immutable outcome of one analysis run, consumed by the formatters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub sources: Vec<String>,
    pub from: Option<DateTime<FixedOffset>>,
    pub to: Option<DateTime<FixedOffset>>,
    pub total_requests: u64,
    pub total_response_size: u64,
    pub average_response_size: f64,
    pub percentile_rank: f64,
    pub percentile_response_size: u64,
    pub server_errors: u64,
    pub top_resources: Vec<CountEntry>,
    pub top_status_codes: Vec<CountEntry>,
    pub top_referrers: Vec<CountEntry>,
}

impl AnalysisReport {
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn window(&self) -> TimeRange {
        TimeRange::new(self.from, self.to)
    }
}

/// Keep the `n` largest counts, highest first; equal counts sort by label.
pub fn top_n(counts: HashMap<String, u64>, n: usize) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect();
    entries.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(n);
    entries
}
