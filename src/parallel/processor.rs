//! Pipeline orchestration
//!
//! Line producers -> one parse-filter thread -> bounded record channel ->
//! fixed pool of aggregation workers -> single finalization after join.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use tracing::info;

use crate::aggregate::{AnalysisReport, Aggregator, ReportSettings};
use crate::config::AnalyzerConfig;
use crate::error::SourceError;
use crate::filters::FieldFilter;
use crate::parsers::AccessLogParser;
use crate::readers::{open_source, LineStream, DEFAULT_CHANNEL_CAPACITY};
use crate::stats::{PipelineStats, StatsSnapshot};

use super::worker::{filter_thread, worker_thread, FilterStage};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub field_filter: FieldFilter,
    pub report: ReportSettings,
    pub workers: usize,
    pub buffer_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            field_filter: FieldFilter::Any,
            report: ReportSettings::default(),
            workers: 8,
            buffer_size: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Finished report plus the counters gathered while producing it.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    pub stats: StatsSnapshot,
}

/// Open the configured source and analyze it.
///
/// Source failures surface here, before any thread of the pipeline starts.
pub fn run_analysis(config: &AnalyzerConfig) -> Result<AnalysisRun, SourceError> {
    let settings = config.pipeline_settings();
    info!(
        locator = %config.input.locator,
        workers = settings.workers,
        filter = ?settings.field_filter,
        window = %settings.report.window,
        "starting analysis"
    );

    let stream = open_source(&config.input.locator, settings.buffer_size)?;
    let run = analyze_stream(stream, &settings);

    info!(
        requests = run.report.total_requests,
        sources = run.report.source_count(),
        elapsed_ms = run.stats.processing_time.as_millis() as u64,
        "analysis finished"
    );
    Ok(run)
}

/// Run the pipeline over an already opened stream.
pub fn analyze_stream(stream: LineStream, settings: &PipelineSettings) -> AnalysisRun {
    let stats = Arc::new(PipelineStats::new());
    let aggregator = Arc::new(Aggregator::new());
    let workers = settings.workers.max(1);
    let (record_sender, record_receiver) = bounded(settings.buffer_size.max(1));

    let filter_handle = {
        let stage = FilterStage {
            parser: AccessLogParser::new(),
            field_filter: settings.field_filter.clone(),
            window: settings.report.window,
        };
        let stats = Arc::clone(&stats);
        thread::spawn(move || filter_thread(stream, stage, record_sender, stats))
    };

    let mut worker_handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let record_receiver = record_receiver.clone();
        let aggregator = Arc::clone(&aggregator);
        let stats = Arc::clone(&stats);
        worker_handles.push(thread::spawn(move || {
            worker_thread(worker_id, record_receiver, aggregator, stats)
        }));
    }
    drop(record_receiver);

    if let Err(panic) = filter_handle.join() {
        std::panic::resume_unwind(panic);
    }
    for handle in worker_handles {
        if let Err(panic) = handle.join() {
            std::panic::resume_unwind(panic);
        }
    }

    let totals = match Arc::try_unwrap(aggregator) {
        Ok(aggregator) => aggregator.into_totals(),
        Err(shared) => shared.snapshot(),
    };
    let sources = totals.sources().len();
    let report = totals.finalize(&settings.report);

    AnalysisRun {
        report,
        stats: stats.snapshot(sources),
    }
}
