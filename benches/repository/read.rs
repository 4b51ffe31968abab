use super::fresh_repository;
use criterion::{BenchmarkId, Criterion, Throughput};
use seglog_rs::{FlushMode, ReadControl};
use std::hint::black_box;

const ENTRIES: u64 = 10_000;

/// Register point read and range read benchmarks.
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("LogRepository - Read");

    let (_dir, mut repo) = fresh_repository(FlushMode::Buffered);
    for i in 0..ENTRIES {
        repo.append(&i.to_be_bytes().repeat(16)).expect("append");
    }
    repo.sync().expect("sync");

    group.bench_function("read", |b| {
        let mut ordinal = 0u64;
        b.iter(|| {
            ordinal = (ordinal + 7919) % ENTRIES;
            black_box(repo.read(0, ordinal).expect("read"))
        });
    });

    group.bench_function("read_into", |b| {
        let mut buf = Vec::with_capacity(128);
        let mut ordinal = 0u64;
        b.iter(|| {
            ordinal = (ordinal + 7919) % ENTRIES;
            repo.read_into(0, ordinal, &mut buf).expect("read");
            black_box(buf.len())
        });
    });

    for &len in &[100u64, 1_000, ENTRIES] {
        group.throughput(Throughput::Elements(len));
        group.bench_with_input(BenchmarkId::new("read_range", len), &len, |b, &len| {
            b.iter(|| {
                let mut bytes = 0usize;
                let delivered = repo
                    .read_range(0, 0, Some(len - 1), &mut |_ordinal: u64, entry: &[u8]| {
                        bytes += entry.len();
                        ReadControl::Continue
                    })
                    .expect("range read");
                black_box((delivered, bytes))
            });
        });
    }

    group.finish();
}
