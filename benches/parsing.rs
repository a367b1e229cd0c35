mod config_generator;

use config_generator::generate_properties;
use criterion::{criterion_group, criterion_main, Criterion};
use propfile::{Properties, ReadOptions};

fn parsing_benchmarks(c: &mut Criterion) {
    // Generate files of different sizes
    let small = generate_properties(50);
    let medium = generate_properties(300);
    let large = generate_properties(1_000);
    let xlarge = generate_properties(10_000);

    let mut group = c.benchmark_group("parsing");

    group.bench_function("small_50_lines", |b| {
        b.iter(|| Properties::parse_str(&small, ReadOptions::default()).unwrap())
    });

    group.bench_function("medium_300_lines", |b| {
        b.iter(|| Properties::parse_str(&medium, ReadOptions::default()).unwrap())
    });

    group.bench_function("large_1000_lines", |b| {
        b.iter(|| Properties::parse_str(&large, ReadOptions::default()).unwrap())
    });

    group.bench_function("xlarge_10000_lines", |b| {
        b.iter(|| Properties::parse_str(&xlarge, ReadOptions::default()).unwrap())
    });

    group.bench_function("lenient_1000_lines", |b| {
        b.iter(|| Properties::parse_str(&large, ReadOptions::lenient()).unwrap())
    });

    group.finish();
}

fn perf_benchmark(c: &mut Criterion) {
    // 100k lines, generated once, benchmarked separately
    let perf = generate_properties(100_000);

    let mut group = c.benchmark_group("perf");
    group.sample_size(10);

    group.bench_function("perf_100k_lines", |b| {
        b.iter(|| Properties::parse_str(&perf, ReadOptions::default()).unwrap())
    });

    group.finish();
}

criterion_group!(benches, parsing_benchmarks, perf_benchmark);
criterion_main!(benches);
