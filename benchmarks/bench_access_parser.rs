use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use logtally::filters::{FieldFilter, FilterField};
use logtally::parsers::{AccessLogParser, RecordParser};

const COMBINED_LINE: &str = r#"93.180.71.3 - - [17/May/2015:08:05:32 +0000] "GET /downloads/product_1 HTTP/1.1" 304 0 "-" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.21)""#;
const COMMON_LINE: &str =
    r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#;
const GARBAGE_LINE: &str = "2015-05-17 08:05:32 INFO worker started with 8 threads";

fn bench_parse_combined(c: &mut Criterion) {
    let parser = AccessLogParser::new();
    c.bench_function("parse_combined_line", |b| {
        b.iter(|| black_box(parser.parse("bench.log", black_box(COMBINED_LINE))));
    });
}

fn bench_parse_common(c: &mut Criterion) {
    let parser = AccessLogParser::new();
    c.bench_function("parse_common_line", |b| {
        b.iter(|| black_box(parser.parse("bench.log", black_box(COMMON_LINE))));
    });
}

fn bench_reject_garbage(c: &mut Criterion) {
    let parser = AccessLogParser::new();
    c.bench_function("reject_malformed_line", |b| {
        b.iter(|| black_box(parser.parse("bench.log", black_box(GARBAGE_LINE))));
    });
}

fn bench_parse_tagged(c: &mut Criterion) {
    let parser = AccessLogParser::new();
    let tagged = format!("access.log${}", COMBINED_LINE);
    c.bench_function("parse_tagged_line", |b| {
        b.iter(|| black_box(parser.parse_tagged(black_box(&tagged))));
    });
}

fn bench_field_filter(c: &mut Criterion) {
    let record = AccessLogParser::new()
        .parse("bench.log", COMBINED_LINE)
        .expect("benchmark line parses");
    let agent = FieldFilter::new(FilterField::Agent, "DEBIAN APT-HTTP/1.3 (0.8.16~EXP12UBUNTU10.21)");
    let status = FieldFilter::new(FilterField::Status, "304");
    c.bench_function("filter_agent_case_insensitive", |b| {
        b.iter(|| black_box(agent.matches(black_box(&record))));
    });
    c.bench_function("filter_status_exact", |b| {
        b.iter(|| black_box(status.matches(black_box(&record))));
    });
}

criterion_group!(
    access_parser_benches,
    bench_parse_combined,
    bench_parse_common,
    bench_reject_garbage,
    bench_parse_tagged,
    bench_field_filter
);
criterion_main!(access_parser_benches);
