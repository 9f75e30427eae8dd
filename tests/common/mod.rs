// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tempfile::NamedTempFile;

pub const SAMPLE_LINES: &[&str] = &[
    r#"93.180.71.3 - - [17/May/2015:08:05:32 +0000] "GET /downloads/product_1 HTTP/1.1" 304 0 "-" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.21)""#,
    r#"93.180.71.3 - - [17/May/2015:08:05:23 +0000] "GET /downloads/product_1 HTTP/1.1" 304 0 "-" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.21)""#,
    r#"80.91.33.133 - - [17/May/2015:08:05:24 +0000] "GET /downloads/product_1 HTTP/1.1" 304 0 "-" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.17)""#,
    r#"217.168.17.5 - - [17/May/2015:08:05:34 +0000] "GET /downloads/product_1 HTTP/1.1" 200 490 "-" "Debian APT-HTTP/1.3 (0.8.10.3)""#,
    r#"217.168.17.5 - - [17/May/2015:08:05:09 +0000] "GET /downloads/product_2 HTTP/1.1" 200 490 "-" "Debian APT-HTTP/1.3 (0.8.10.3)""#,
    r#"93.180.71.3 - - [17/May/2015:08:05:57 +0000] "GET /downloads/product_1 HTTP/1.1" 304 0 "-" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.21)""#,
    r#"217.168.17.5 - - [17/May/2015:08:05:02 +0000] "GET /downloads/product_2 HTTP/1.1" 404 337 "-" "Debian APT-HTTP/1.3 (0.8.10.3)""#,
    r#"217.168.17.5 - admin [17/May/2015:08:05:42 +0000] "GET /downloads/product_1 HTTP/1.1" 404 332 "http://example.com/" "Debian APT-HTTP/1.3 (0.8.10.3)""#,
    r#"80.91.33.133 - - [17/May/2015:08:05:01 +0000] "GET /downloads/product_1 HTTP/1.1" 500 700 "http://example.com/" "Debian APT-HTTP/1.3 (0.8.16~exp12ubuntu10.17)""#,
    r#"93.180.71.3 - - [18/May/2015:08:05:27 +0000] "POST /api/upload HTTP/1.1" 503 1200 "-" "curl/7.68.0""#,
];

pub fn sample_log() -> String {
    let mut text = SAMPLE_LINES.join("\n");
    text.push('\n');
    text
}

fn binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_logtally")
}

fn collect(output: std::process::Output) -> (String, String, i32) {
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Run logtally with the given arguments, ignoring any user configuration.
pub fn run_logtally(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(binary_path())
        .arg("--ignore-config")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute logtally");
    collect(output)
}

/// Run logtally without `--ignore-config`, with HOME pointed at `home`.
pub fn run_logtally_in_home(args: &[&str], home: &Path) -> (String, String, i32) {
    let output = Command::new(binary_path())
        .args(args)
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute logtally");
    collect(output)
}

/// Write `file_content` to a temporary file and analyze it.
pub fn run_logtally_with_file(args: &[&str], file_content: &str) -> (String, String, i32) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(file_content.as_bytes())
        .expect("Failed to write to temp file");

    let mut full_args = args.to_vec();
    full_args.push(temp_file.path().to_str().unwrap());
    run_logtally(&full_args)
}

/// Serve one canned HTTP response on a local port; returns the base URL.
pub fn serve_once(status_line: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    format!("http://{}", addr)
}

/// Value column of a `| label | value |` row.
pub fn table_value(report: &str, label: &str) -> Option<String> {
    report.lines().find_map(|line| {
        let cells: Vec<&str> = line.split('|').map(str::trim).collect();
        if cells.len() >= 3 && cells[1] == label {
            Some(cells[2].to_string())
        } else {
            None
        }
    })
}

/// Count in the `--stats` summary, e.g. `stats_count(stderr, "accepted")`.
pub fn stats_count(stderr: &str, what: &str) -> Option<u64> {
    let line = stderr.lines().find(|l| l.starts_with("Lines processed:"))?;
    let body = line.trim_start_matches("Lines processed:");
    body.split(',').find_map(|part| {
        let part = part.trim();
        let (number, label) = part.split_once(' ')?;
        if label.starts_with(what) {
            number.parse().ok()
        } else {
            None
        }
    })
}
