/*
 * Moth Swarm Benchmark
 *
 * Measures the cost of one population tick across population sizes, with
 * sequential and rayon updates, and of the sampled separation term on its
 * own. Every run is seeded so numbers are comparable between builds.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use moths::population::{PeerSnapshot, Population};
use moths::steering;
use moths::SwarmConfig;

const FRAME: f32 = 1.0 / 60.0;

// Benchmark the full population tick
fn bench_population_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_tick");

    for &parallel in [false, true].iter() {
        let config = SwarmConfig {
            enable_parallel: parallel,
            ..SwarmConfig::default()
        };
        let mode = if parallel { "parallel" } else { "sequential" };

        for num_moths in [24, 60, 500, 5000].iter() {
            group.bench_with_input(BenchmarkId::new(mode, num_moths), num_moths, |b, &n| {
                let mut rng = StdRng::seed_from_u64(42);
                let mut population = Population::spawn(Vec3::ZERO, n, &config, &mut rng);
                let repulsion = vec3(0.8, 0.2, 0.0);

                b.iter(|| {
                    population.tick(black_box(FRAME), repulsion, &config);
                });
            });
        }
    }

    group.finish();
}

// Benchmark the sampled separation term alone
fn bench_separation(c: &mut Criterion) {
    let mut group = c.benchmark_group("separation");
    let config = SwarmConfig::default();

    for num_moths in [60, 5000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_moths), num_moths, |b, &n| {
            let mut rng = StdRng::seed_from_u64(7);
            let population = Population::spawn(Vec3::ZERO, n, &config, &mut rng);
            let mut peers = PeerSnapshot::default();
            peers.capture(population.moths());

            b.iter(|| {
                let mut total = Vec3::ZERO;
                for (i, moth) in population.moths().iter().enumerate() {
                    total += steering::separation(moth.position, i, &peers, &mut rng, &config);
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_population_tick, bench_separation
}
criterion_main!(benches);
