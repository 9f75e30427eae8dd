#![no_main]

use libfuzzer_sys::fuzz_target;
use logtally::parsers::{AccessLogParser, RecordParser};
use logtally::record::is_server_error_status;

const MAX_LINE_LEN: usize = 4096;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_LINE_LEN {
        return;
    }
    let line = String::from_utf8_lossy(data);
    let parser = AccessLogParser::new();

    if let Ok(record) = parser.parse("fuzz.log", &line) {
        // Accepted records always carry the mandatory fields.
        assert!(!record.remote_addr.is_empty());
        assert!(!record.method.is_empty());
        assert!(!record.resource.is_empty());
        let code = record.status_code();
        assert!((100..600).contains(&code));
        let _ = is_server_error_status(code);
    }

    // Tagged form agrees with the untagged parse unless the line adds another `$`.
    let tagged = format!("fuzz.log${}", line);
    if line.contains('$') {
        assert!(parser.parse_tagged(&tagged).is_err());
    } else {
        assert_eq!(
            parser.parse_tagged(&tagged).ok(),
            parser.parse("fuzz.log", &line).ok()
        );
    }
});
