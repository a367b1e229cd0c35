mod config_generator;

use config_generator::generate_properties;
use criterion::{criterion_group, criterion_main, Criterion};
use propfile::{Commentable, Hideable, Properties, ReadOptions};

fn retrieval_benchmarks(c: &mut Criterion) {
    // Parse once for retrieval benchmarks
    let text = generate_properties(1_000);
    let props = Properties::parse_str(&text, ReadOptions::default()).unwrap();

    let mut group = c.benchmark_group("retrieval");

    group.bench_function("get", |b| b.iter(|| props.get("section.3.int.0")));

    group.bench_function("get_parsed", |b| {
        b.iter(|| props.get_parsed("section.3.url.4"))
    });

    group.bench_function("get_cast", |b| {
        b.iter(|| props.get_cast("section.3.float.1"))
    });

    group.bench_function("get_comment", |b| {
        b.iter(|| props.get_comment("section.3.int.0"))
    });

    group.bench_function("is_hidden", |b| {
        b.iter(|| props.is_hidden("section.3.disabled.3"))
    });

    group.bench_function("gets_wildcard", |b| {
        b.iter(|| props.gets("section.*.name.*").unwrap().len())
    });

    group.bench_function("groups", |b| b.iter(|| props.groups().unwrap().len()));

    group.bench_function("keys_iteration", |b| b.iter(|| props.keys(true).len()));

    group.finish();
}

criterion_group!(benches, retrieval_benchmarks);
criterion_main!(benches);
