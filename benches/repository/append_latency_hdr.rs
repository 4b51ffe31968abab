//! Append latency distribution per flush mode, reported as HDR percentiles.

use hdrhistogram::Histogram;
use seglog_rs::{FlushMode, LogRepository, RepositoryConfig};
use std::time::Instant;

const SAMPLES: usize = 5_000;
const PAYLOAD_SIZES: [usize; 3] = [64, 1024, 16 * 1024];

fn measure(flush_mode: FlushMode, size: usize) -> Histogram<u64> {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RepositoryConfig::new(dir.path()).with_flush_mode(flush_mode);
    let mut repo = LogRepository::with_config(config).expect("open repository");
    repo.switch_to_segment(0).expect("switch");

    let payload = vec![0x5A; size];
    let mut histogram = Histogram::<u64>::new(3).expect("histogram");
    for _ in 0..SAMPLES {
        let start = Instant::now();
        repo.append(&payload).expect("append");
        let nanos = start.elapsed().as_nanos() as u64;
        histogram.record(nanos.max(1)).expect("record");
    }
    histogram
}

fn main() {
    for flush_mode in [FlushMode::Buffered, FlushMode::SyncEveryAppend] {
        for size in PAYLOAD_SIZES {
            let h = measure(flush_mode, size);
            println!(
                "{flush_mode:<18} {size:>6}B  p50={:>9}ns p90={:>9}ns p99={:>9}ns p99.9={:>9}ns max={:>9}ns",
                h.value_at_quantile(0.50),
                h.value_at_quantile(0.90),
                h.value_at_quantile(0.99),
                h.value_at_quantile(0.999),
                h.max(),
            );
        }
    }
}
