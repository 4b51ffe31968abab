use criterion::{criterion_group, criterion_main};

mod repository;

use repository::append::register_benchmarks as register_append_benchmarks;
use repository::read::register_benchmarks as register_read_benchmarks;

criterion_group!(
    benches,
    register_append_benchmarks,
    register_read_benchmarks,
);

criterion_main!(benches);
