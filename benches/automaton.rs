//! Benchmarks for automaton steps.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cellular_automata::{
    compute::Automaton,
    initializers::RandomOverlay,
    rules::{BurnGrovesRule, LifeRule},
    schema::SimulationConfig,
};

fn bench_life_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("life_step");

    for size in [64, 128, 256, 512] {
        let mut automaton = Automaton::builder()
            .shape([size, size])
            .initializer(RandomOverlay {
                overlay_value: 1,
                p_value: 0.3,
            })
            .rule(LifeRule::default())
            .seed(0)
            .build()
            .unwrap();
        automaton.start().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    black_box(&mut automaton).step().unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_forest_fire(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fire");

    for size in [128, 256] {
        let config = SimulationConfig {
            random_seed: Some(0),
            ..SimulationConfig::forest_fire(&[size, size])
        };
        let mut automaton = config.build_automaton().unwrap();
        automaton.start().unwrap();
        // Grow some forest before timing.
        automaton.run(200).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    black_box(&mut automaton).step().unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_burn_groves(c: &mut Criterion) {
    let mut group = c.benchmark_group("burn_groves");

    for size in [128, 256] {
        let mut automaton = Automaton::builder()
            .shape([size, size])
            .initializer(RandomOverlay {
                overlay_value: 1,
                p_value: 0.55,
            })
            .rule(BurnGrovesRule {
                p_fire: 1e-3,
                ..Default::default()
            })
            .seed(0)
            .build()
            .unwrap();
        automaton.start().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    black_box(&mut automaton).step().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_life_step, bench_forest_fire, bench_burn_groves);
criterion_main!(benches);
