use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use logtally::aggregate::{ReportSettings, RunningTotals};
use logtally::distribution::ApproximateDistribution;
use logtally::parsers::{AccessLogParser, RecordParser};

// Deterministic spread of sizes from a few bytes up to a few megabytes.
fn sample_sizes(count: usize) -> Vec<u64> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state % 5_000_000
        })
        .collect()
}

fn bench_record(c: &mut Criterion) {
    let sizes = sample_sizes(10_000);
    c.bench_function("distribution_record_10k", |b| {
        b.iter(|| {
            let mut dist = ApproximateDistribution::for_response_sizes();
            for &size in &sizes {
                let _ = dist.record(black_box(size));
            }
            black_box(dist.count());
        });
    });
}

fn bench_percentile(c: &mut Criterion) {
    let mut dist = ApproximateDistribution::for_response_sizes();
    for size in sample_sizes(100_000) {
        let _ = dist.record(size);
    }
    c.bench_function("distribution_p95", |b| {
        b.iter(|| black_box(dist.percentile(black_box(95.0))));
    });
    c.bench_function("distribution_p99_9", |b| {
        b.iter(|| black_box(dist.percentile(black_box(99.9))));
    });
}

fn bench_apply_and_finalize(c: &mut Criterion) {
    let parser = AccessLogParser::new();
    let records: Vec<_> = sample_sizes(5_000)
        .into_iter()
        .enumerate()
        .filter_map(|(i, size)| {
            let line = format!(
                r#"10.0.{}.{} - - [17/May/2015:08:05:{:02} +0000] "GET /downloads/product_{} HTTP/1.1" {} {} "-" "bench""#,
                i % 250,
                i % 200,
                i % 60,
                i % 40,
                [200, 304, 404, 500][i % 4],
                size
            );
            parser.parse("bench.log", &line).ok()
        })
        .collect();

    c.bench_function("totals_apply_5k_and_finalize", |b| {
        b.iter(|| {
            let mut totals = RunningTotals::new();
            for record in &records {
                let _ = totals.apply(black_box(record));
            }
            black_box(totals.finalize(&ReportSettings::default()));
        });
    });
}

criterion_group!(
    distribution_benches,
    bench_record,
    bench_percentile,
    bench_apply_and_finalize
);
criterion_main!(distribution_benches);
