use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by the reader, the parse-filter stage and the workers.
#[derive(Debug)]
pub struct PipelineStats {
    lines_read: AtomicU64,
    lines_malformed: AtomicU64,
    lines_invalid: AtomicU64,
    records_filtered: AtomicU64,
    records_accepted: AtomicU64,
    histogram_drops: AtomicU64,
    start_time: Instant,
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self {
            lines_read: AtomicU64::new(0),
            lines_malformed: AtomicU64::new(0),
            lines_invalid: AtomicU64::new(0),
            records_filtered: AtomicU64::new(0),
            records_accepted: AtomicU64::new(0),
            histogram_drops: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn add_line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_malformed(&self) {
        self.lines_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_invalid(&self) {
        self.lines_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_filtered(&self) {
        self.records_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_accepted(&self) {
        self.records_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_histogram_drop(&self) {
        self.histogram_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, sources: usize) -> StatsSnapshot {
        StatsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            lines_malformed: self.lines_malformed.load(Ordering::Relaxed),
            lines_invalid: self.lines_invalid.load(Ordering::Relaxed),
            records_filtered: self.records_filtered.load(Ordering::Relaxed),
            records_accepted: self.records_accepted.load(Ordering::Relaxed),
            histogram_drops: self.histogram_drops.load(Ordering::Relaxed),
            sources,
            processing_time: self.start_time.elapsed(),
        }
    }
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub lines_read: u64,
    pub lines_malformed: u64,
    pub lines_invalid: u64,
    pub records_filtered: u64,
    pub records_accepted: u64,
    pub histogram_drops: u64,
    pub sources: usize,
    pub processing_time: Duration,
}

impl StatsSnapshot {
    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines processed: {} total, {} accepted, {} malformed, {} invalid, {} filtered",
            self.lines_read,
            self.records_accepted,
            self.lines_malformed,
            self.lines_invalid,
            self.records_filtered
        );

        if self.histogram_drops > 0 {
            output.push_str(&format!(", {} out of histogram range", self.histogram_drops));
        }

        if self.sources > 0 {
            output.push_str(&format!(", {} sources", self.sources));
        }

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        if processing_time_ms > 0 && self.lines_read > 0 {
            let lines_per_sec = (self.lines_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output
    }
}
