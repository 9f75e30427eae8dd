mod common;
use common::*;

use std::fs;
use tempfile::TempDir;

#[test]
fn test_markdown_report_for_single_file() {
    let (stdout, stderr, exit_code) = run_logtally_with_file(&[], &sample_log());
    assert_eq!(exit_code, 0, "logtally should exit successfully, stderr: {}", stderr);

    assert!(stdout.starts_with("#### General Information"));
    assert!(stdout.contains("#### Requested Resources"));
    assert!(stdout.contains("#### Response Codes"));
    assert!(stdout.contains("#### Additional Metrics"));
    assert!(stdout.contains("#### Referrers"));

    assert_eq!(table_value(&stdout, "Number of Sources").as_deref(), Some("1"));
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("10"));
    assert_eq!(table_value(&stdout, "Average Response Size").as_deref(), Some("354.9"));
    assert_eq!(table_value(&stdout, "p95 Response Size").as_deref(), Some("1200"));
    assert_eq!(table_value(&stdout, "Server Errors (5xx)").as_deref(), Some("2"));
    assert_eq!(table_value(&stdout, "Start Date").as_deref(), Some("-"));
    assert_eq!(table_value(&stdout, "End Date").as_deref(), Some("-"));
    assert_eq!(table_value(&stdout, "/downloads/product_1").as_deref(), Some("7"));
    assert_eq!(table_value(&stdout, "http://example.com/").as_deref(), Some("2"));
}

#[test]
fn test_status_code_ties_are_ordered_by_label() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(&[], &sample_log());
    assert_eq!(exit_code, 0);

    let section: Vec<&str> = stdout
        .split("#### Response Codes")
        .nth(1)
        .unwrap()
        .split("####")
        .next()
        .unwrap()
        .lines()
        .filter(|l| l.starts_with("| ") && !l.contains("Code") && !l.contains("---"))
        .collect();

    assert_eq!(section.len(), 3);
    assert!(section[0].contains("304"));
    assert!(section[1].contains("200"));
    assert!(section[2].contains("404"));
}

#[test]
fn test_adoc_report() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(&["-F", "adoc"], &sample_log());
    assert_eq!(exit_code, 0);
    assert!(stdout.starts_with("=== General Information"));
    assert!(stdout.contains("=== Referrers"));
    assert!(!stdout.contains("####"));
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("10"));
}

#[test]
fn test_json_report() {
    let (stdout, _stderr, exit_code) =
        run_logtally_with_file(&["--format", "json", "--top", "2"], &sample_log());
    assert_eq!(exit_code, 0);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");
    assert_eq!(value["total_requests"], 10);
    assert_eq!(value["total_response_size"], 3549);
    assert_eq!(value["server_errors"], 2);
    assert_eq!(value["top_resources"].as_array().unwrap().len(), 2);
    assert_eq!(value["top_status_codes"][0]["label"], "304");
    assert_eq!(value["top_status_codes"][0]["count"], 4);
    assert!(value["from"].is_null());
}

#[test]
fn test_custom_percentile() {
    let (stdout, _stderr, exit_code) =
        run_logtally_with_file(&["--percentile", "50"], &sample_log());
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "p50 Response Size").as_deref(), Some("332"));
}

#[test]
fn test_filter_by_status() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(
        &["--filter-field", "status", "--filter-value", "404"],
        &sample_log(),
    );
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("2"));
    assert_eq!(table_value(&stdout, "Average Response Size").as_deref(), Some("334.5"));
    assert_eq!(table_value(&stdout, "Server Errors (5xx)").as_deref(), Some("0"));
}

#[test]
fn test_filter_by_method_is_case_insensitive() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(
        &["--filter-field", "method", "--filter-value", "post"],
        &sample_log(),
    );
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("1"));
    assert_eq!(table_value(&stdout, "/api/upload").as_deref(), Some("1"));
}

#[test]
fn test_filter_by_remote_user() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(
        &["--filter-field", "remote_user", "--filter-value", "ADMIN"],
        &sample_log(),
    );
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("1"));
}

#[test]
fn test_time_window() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(
        &["--from", "2015-05-18"],
        &sample_log(),
    );
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("1"));
    assert_eq!(
        table_value(&stdout, "Start Date").as_deref(),
        Some("18/May/2015:00:00:00 +0000")
    );
    assert_eq!(table_value(&stdout, "End Date").as_deref(), Some("-"));
}

#[test]
fn test_time_window_bounds_are_inclusive() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(
        &[
            "--from",
            "2015-05-17T08:05:09+0000",
            "--to",
            "2015-05-17T08:05:24+0000",
        ],
        &sample_log(),
    );
    assert_eq!(exit_code, 0);
    // 08:05:09, 08:05:23 and 08:05:24
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("3"));
}

#[test]
fn test_malformed_lines_are_skipped() {
    let mut content = sample_log();
    content.push_str("this is not an access log line\n\n");
    content.push_str(
        r#"10.0.0.1 - - [not a date] "GET / HTTP/1.1" 200 10 "-" "-""#,
    );
    content.push('\n');

    let (stdout, stderr, exit_code) = run_logtally_with_file(&["--stats"], &content);
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("10"));
    assert_eq!(stats_count(&stderr, "accepted"), Some(10));
    assert_eq!(stats_count(&stderr, "malformed"), Some(2));
    assert_eq!(stats_count(&stderr, "invalid"), Some(1));
}

#[test]
fn test_stats_are_not_printed_by_default() {
    let (_stdout, stderr, exit_code) = run_logtally_with_file(&[], &sample_log());
    assert_eq!(exit_code, 0);
    assert!(!stderr.contains("Lines processed:"));
}

#[test]
fn test_empty_input_produces_zero_report() {
    let (stdout, _stderr, exit_code) = run_logtally_with_file(&[], "");
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("0"));
    assert_eq!(table_value(&stdout, "Average Response Size").as_deref(), Some("0"));
    assert_eq!(table_value(&stdout, "p95 Response Size").as_deref(), Some("0"));
    assert_eq!(table_value(&stdout, "Number of Sources").as_deref(), Some("0"));
}

#[test]
fn test_glob_over_multiple_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.log"), SAMPLE_LINES[..4].join("\n")).unwrap();
    fs::write(dir.path().join("b.log"), SAMPLE_LINES[4..].join("\n")).unwrap();
    fs::write(dir.path().join("c.txt"), SAMPLE_LINES.join("\n")).unwrap();

    let pattern = dir.path().join("*.log");
    let (stdout, stderr, exit_code) = run_logtally(&[pattern.to_str().unwrap()]);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    assert_eq!(table_value(&stdout, "Number of Sources").as_deref(), Some("2"));
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("10"));
    let sources: Vec<&str> = stdout.lines().filter(|l| l.contains("- Source")).collect();
    assert_eq!(sources.len(), 2);
    assert!(stdout.contains("a.log"));
    assert!(stdout.contains("b.log"));
    assert!(!stdout.contains("c.txt"));
}

#[test]
fn test_gzip_input() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("access.log.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(sample_log().as_bytes()).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();

    let (stdout, _stderr, exit_code) = run_logtally(&[path.to_str().unwrap()]);
    assert_eq!(exit_code, 0);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("10"));
    assert_eq!(table_value(&stdout, "- Source").as_deref(), Some("access.log.gz"));
}

#[test]
fn test_output_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.md");

    let (stdout, _stderr, exit_code) =
        run_logtally_with_file(&["-o", output.to_str().unwrap()], &sample_log());
    assert_eq!(exit_code, 0);
    assert!(stdout.is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("#### General Information"));
    assert_eq!(table_value(&written, "Total Requests").as_deref(), Some("10"));
}

#[test]
fn test_missing_file_writes_error_document() {
    let (stdout, stderr, exit_code) = run_logtally(&["/definitely/not/here/access.log"]);
    assert_eq!(exit_code, 1);
    assert!(stdout.starts_with("### An error occurred"));
    assert!(stdout.contains("/definitely/not/here/access.log"));
    assert!(stderr.contains("logtally: Error:"));
}

#[test]
fn test_missing_file_json_error_document() {
    let (stdout, _stderr, exit_code) =
        run_logtally(&["-F", "json", "/definitely/not/here/*.log"]);
    assert_eq!(exit_code, 1);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(value["error"].as_str().unwrap().contains("/definitely/not/here"));
}

#[test]
fn test_url_input() {
    let url = serve_once("200 OK", &sample_log());
    let (stdout, stderr, exit_code) = run_logtally(&[format!("{}/logs/nginx_logs", url).as_str()]);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(table_value(&stdout, "Total Requests").as_deref(), Some("10"));
    assert_eq!(table_value(&stdout, "- Source").as_deref(), Some("nginx_logs (url)"));
}

#[test]
fn test_url_non_success_status() {
    let url = serve_once("404 Not Found", "missing");
    let (stdout, _stderr, exit_code) = run_logtally(&[format!("{}/logs/gone", url).as_str()]);
    assert_eq!(exit_code, 1);
    assert!(stdout.starts_with("### An error occurred"));
    assert!(stdout.contains("404"));
}

#[test]
fn test_filter_field_without_value_is_usage_error() {
    let (stdout, stderr, exit_code) =
        run_logtally_with_file(&["--filter-field", "status"], &sample_log());
    assert_eq!(exit_code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.contains("--filter-value"));
}

#[test]
fn test_filter_value_without_field_is_usage_error() {
    let (_stdout, stderr, exit_code) =
        run_logtally_with_file(&["--filter-value", "404"], &sample_log());
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("--filter-field"));
}

#[test]
fn test_invalid_date_is_usage_error() {
    let (_stdout, stderr, exit_code) =
        run_logtally_with_file(&["--from", "yesterday"], &sample_log());
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("yesterday"));
}

#[test]
fn test_inverted_window_is_usage_error() {
    let (_stdout, _stderr, exit_code) = run_logtally_with_file(
        &["--from", "2015-05-18", "--to", "2015-05-17"],
        &sample_log(),
    );
    assert_eq!(exit_code, 2);
}

#[test]
fn test_invalid_percentile_is_usage_error() {
    let (_stdout, _stderr, exit_code) =
        run_logtally_with_file(&["--percentile", "0"], &sample_log());
    assert_eq!(exit_code, 2);
}

#[test]
fn test_unknown_format_is_rejected() {
    let (_stdout, _stderr, exit_code) =
        run_logtally_with_file(&["-F", "yaml"], &sample_log());
    assert_eq!(exit_code, 2);
}

#[test]
fn test_single_worker_matches_default() {
    let (default_out, _, code_a) = run_logtally_with_file(&["-F", "json"], &sample_log());
    let (single_out, _, code_b) =
        run_logtally_with_file(&["-F", "json", "--threads", "1", "--buffer-size", "1"], &sample_log());
    assert_eq!(code_a, 0);
    assert_eq!(code_b, 0);
    assert_eq!(default_out, single_out);
}

#[test]
fn test_verbose_logging_goes_to_stderr() {
    let (stdout, stderr, exit_code) = run_logtally_with_file(&["-v"], &sample_log());
    assert_eq!(exit_code, 0);
    assert!(stdout.starts_with("#### General Information"));
    assert!(stderr.contains("DEBUG"));
}
