//! Thread bodies for the pipeline stages.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, trace};

use crate::aggregate::Aggregator;
use crate::error::ParseError;
use crate::filters::{FieldFilter, TimeRange};
use crate::parsers::RecordParser;
use crate::readers::LineStream;
use crate::record::Record;
use crate::stats::PipelineStats;

/// What the parse-filter stage applies to every raw line.
pub(crate) struct FilterStage<P> {
    pub parser: P,
    pub field_filter: FieldFilter,
    pub window: TimeRange,
}

impl<P: RecordParser> FilterStage<P> {
    /// Parse, then window, then field predicate. `None` means the line is dropped.
    pub(crate) fn accept(&self, source_id: &str, line: &str, stats: &PipelineStats) -> Option<Record> {
        let record = match self.parser.parse(source_id, line) {
            Ok(record) => record,
            Err(ParseError::MalformedLine) => {
                stats.add_malformed();
                trace!(source = source_id, "dropping malformed line");
                return None;
            }
            Err(ParseError::InvalidData(reason)) => {
                stats.add_invalid();
                trace!(source = source_id, reason, "dropping invalid line");
                return None;
            }
        };

        if !self.passes(&record) {
            stats.add_filtered();
            return None;
        }

        stats.add_accepted();
        Some(record)
    }

    /// Inactive predicates are skipped outright.
    fn passes(&self, record: &Record) -> bool {
        (!self.window.is_bounded() || self.window.accepts(record))
            && (!self.field_filter.is_active() || self.field_filter.matches(record))
    }
}

/// Single parse-filter stage: drains the line stream and forwards accepted records.
pub(crate) fn filter_thread<P: RecordParser>(
    mut stream: LineStream,
    stage: FilterStage<P>,
    record_sender: Sender<Record>,
    stats: Arc<PipelineStats>,
) {
    for sourced in stream.by_ref() {
        stats.add_line_read();
        let Some(record) = stage.accept(&sourced.source_id, &sourced.line, &stats) else {
            continue;
        };
        if record_sender.send(record).is_err() {
            debug!("all aggregation workers gone, stopping filter stage");
            break;
        }
    }
    drop(record_sender);
    stream.finish();
}

/// Aggregation worker: applies every received record until the channel closes.
pub(crate) fn worker_thread(
    worker_id: usize,
    record_receiver: Receiver<Record>,
    aggregator: Arc<Aggregator>,
    stats: Arc<PipelineStats>,
) {
    let mut consumed = 0u64;
    for record in record_receiver.iter() {
        if let Err(e) = aggregator.consume(&record) {
            stats.add_histogram_drop();
            debug!(worker_id, error = %e, "response size left out of distribution");
        }
        consumed += 1;
    }
    trace!(worker_id, consumed, "worker drained");
}
