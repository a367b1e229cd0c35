mod config_generator;

use config_generator::generate_properties;
use criterion::{criterion_group, criterion_main, Criterion};
use propfile::{Hideable, Properties, ReadOptions};

fn mutation_benchmarks(c: &mut Criterion) {
    let small = generate_properties(50);
    let large = generate_properties(1000);

    let mut group = c.benchmark_group("mutation");

    // Value mutation
    group.bench_function("set", |b| {
        let mut props = Properties::parse_str(&small, ReadOptions::default()).unwrap();
        b.iter(|| props.set("test.value", "42"))
    });

    group.bench_function("hide_unhide", |b| {
        let mut props = Properties::parse_str(&small, ReadOptions::default()).unwrap();
        b.iter(|| {
            props.hide("section.0.int.0").unwrap();
            props.unhide("section.0.int.0");
        })
    });

    // Rendering - small file
    group.bench_function("render_small", |b| {
        let props = Properties::parse_str(&small, ReadOptions::default()).unwrap();
        b.iter(|| props.render().unwrap())
    });

    // Rendering - large file with edits
    group.bench_function("render_large_edited", |b| {
        let mut props = Properties::parse_str(&large, ReadOptions::default()).unwrap();
        props.sets("section.*.float.*", &["1.5"]).unwrap();
        props.set("extra.0", "a").unwrap();
        props.set("extra.1", "b").unwrap();
        props.save();
        b.iter(|| props.render().unwrap())
    });

    // Round-trip: parse -> mutate -> save -> render -> parse
    group.bench_function("round_trip", |b| {
        b.iter(|| {
            let mut props = Properties::parse_str(&small, ReadOptions::default()).unwrap();
            props.set("test.value", "42").unwrap();
            props.save();
            let output = props.render().unwrap();
            Properties::parse_str(&output, ReadOptions::default()).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, mutation_benchmarks);
criterion_main!(benches);
