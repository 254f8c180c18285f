/*
 * Grid Benchmark
 *
 * Measures the operations that dominate a frame: radius queries against the
 * spatial grid, a full flock update and a batch of crystal iterations.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use cellspace::{Containment, Crystal, CrystalConfig, Flock, FlockParams, FrameTime, SpatialGrid};

const WIDTH: f32 = 1024.0;
const HEIGHT: f32 = 768.0;

fn random_points(n: usize, seed: u64) -> Vec<Point2> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| pt2(rng.gen_range(0.0..WIDTH), rng.gen_range(0.0..HEIGHT)))
        .collect()
}

fn bench_grid_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_query");

    for &n in [500usize, 1000, 4000].iter() {
        for wrap in [false, true] {
            let points = random_points(n, 1);
            let mut grid = SpatialGrid::with_cell_size(WIDTH, HEIGHT, 50.0).unwrap();
            grid.set_wrap_mode(wrap, &points);
            grid.rebuild(&points);

            let label = if wrap { "wrap" } else { "clamped" };
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, _| {
                b.iter(|| {
                    let mut total = 0;
                    for p in &points {
                        total += grid.query(&points, black_box(*p), 25.0).len();
                    }
                    black_box(total)
                });
            });
        }
    }

    group.finish();
}

fn bench_flock_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("flock_update");
    group.measurement_time(Duration::from_secs(10));

    for &n in [250usize, 1000].iter() {
        for containment in [Containment::Walls, Containment::Wrap] {
            let params = FlockParams {
                containment,
                ..FlockParams::default()
            };
            let mut flock = Flock::with_seed(WIDTH, HEIGHT, &params, 7).unwrap();
            for p in random_points(n, 2) {
                flock.spawn_boid(p, 3.0, 0.1);
            }

            let id = BenchmarkId::new(format!("{:?}", containment), n);
            group.bench_with_input(id, &n, |b, _| {
                b.iter(|| flock.update(&params, FrameTime::fixed(1.0 / 60.0)));
            });
        }
    }

    group.finish();
}

fn bench_crystal(c: &mut Criterion) {
    let mut group = c.benchmark_group("crystal");

    for &iterations in [10_000usize, 100_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(iterations), &iterations, |b, &iterations| {
            let mut crystal = Crystal::with_seed(WIDTH, HEIGHT, CrystalConfig::default(), 3).unwrap();
            crystal.add_particle(pt2(WIDTH / 2.0, HEIGHT / 2.0));
            b.iter(|| black_box(crystal.update(iterations)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_grid_query, bench_flock_update, bench_crystal);
criterion_main!(benches);
