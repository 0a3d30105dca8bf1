use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use grid_racetrack_core::analyzer::Analyzer;
use grid_racetrack_core::circuit::{patatoid, Circuit};

fn benchmark_analyzer_build(c: &mut Criterion) {
    c.bench_function("analyzer_build_patatoid", |b| {
        b.iter(|| {
            let circuit = Circuit::build(black_box(&patatoid())).unwrap();
            black_box(Analyzer::build(circuit).unwrap());
        })
    });
}

fn benchmark_next_states(c: &mut Criterion) {
    let circuit = Circuit::build(&patatoid()).unwrap();
    let analyzer = Analyzer::build(circuit).unwrap();
    let start = *analyzer.circuit().starting_points().iter().next().unwrap();
    let states = analyzer.next_states(None, &Default::default()).unwrap();
    let current = states.into_iter().find(|s| s.xy == start).unwrap();

    c.bench_function("next_states_from_start", |b| {
        b.iter(|| black_box(analyzer.next_states(black_box(Some(current)), &Default::default()).unwrap()))
    });
}

criterion_group!(benches, benchmark_analyzer_build, benchmark_next_states);
criterion_main!(benches);
