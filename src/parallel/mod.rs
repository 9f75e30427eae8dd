//! Concurrent parse-filter-aggregate pipeline
//!
//! # Module Structure
//!
//! - `worker`: the parse-filter stage and the aggregation worker loop
//! - `processor`: wiring of channels and threads, join and finalization

mod processor;
mod worker;

pub use processor::{analyze_stream, run_analysis, AnalysisRun, PipelineSettings};
