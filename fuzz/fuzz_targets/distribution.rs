#![no_main]

use libfuzzer_sys::fuzz_target;
use logtally::distribution::ApproximateDistribution;

fuzz_target!(|data: &[u8]| {
    let mut dist = ApproximateDistribution::for_response_sizes();
    let mut max_seen = 0u64;

    for chunk in data.chunks_exact(8) {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(chunk);
        let value = u64::from_le_bytes(raw) % (dist.highest_trackable() * 2);
        if dist.record(value).is_ok() {
            max_seen = max_seen.max(value);
        } else {
            assert!(value > dist.highest_trackable());
        }
    }

    let mut last = 0u64;
    for p in [0.1, 25.0, 50.0, 90.0, 99.0, 100.0] {
        let v = dist.percentile(p);
        assert!(v >= last, "percentiles must be monotonic");
        assert!(v <= dist.highest_trackable());
        last = v;
    }
    if dist.is_empty() {
        assert_eq!(last, 0);
    } else {
        assert!(last >= max_seen);
    }
});
