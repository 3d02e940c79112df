//! # Step Benchmark
//!
//! TARGET:
//! - 1,000,000 avoiders, 20 avoid-targets
//! - One full step (Movement, Avoidance, extraction) per iteration
//!
//! Run with: `cargo bench --package dodsim_core --bench step_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dodsim_core::{
    extract, populate, random, AvoidanceSystem, MovementSystem, RenderRecord, SimConfig,
    Simulation, World, DEFAULT_BOUNDS,
};

const OBJECT_COUNT: usize = 1_000_000;
const TARGET_COUNT: usize = 20;
const DELTA_TIME: f32 = 1.0 / 60.0;

fn populated(objects: usize) -> (World, SimConfig) {
    let config = SimConfig::new(objects, TARGET_COUNT, DEFAULT_BOUNDS, 0);
    let mut world = World::with_capacity(config.entity_count());
    populate(&mut world, &config, &mut random::seeded(config.seed)).expect("populate");
    (world, config)
}

/// The headline number: one complete frame over the reference scene.
fn bench_full_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_step");
    group.sample_size(20);

    for count in [10_000, 100_000, OBJECT_COUNT] {
        let mut sim = Simulation::new(SimConfig::new(count, TARGET_COUNT, DEFAULT_BOUNDS, 0));
        sim.initialize().expect("initialize");

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(sim.step(0.0, DELTA_TIME).expect("step").len()));
        });
    }

    group.finish();
}

fn bench_movement(c: &mut Criterion) {
    let (mut world, _) = populated(OBJECT_COUNT);
    let movement = MovementSystem::setup(&world).expect("setup");

    c.bench_function("movement_1M", |b| {
        b.iter(|| {
            movement.update(&mut world, DELTA_TIME);
            black_box(world.positions().len())
        });
    });
}

fn bench_avoidance(c: &mut Criterion) {
    let (mut world, _) = populated(OBJECT_COUNT);
    let avoidance = AvoidanceSystem::setup(&world).expect("setup");

    c.bench_function("avoidance_1M_x20", |b| {
        b.iter(|| black_box(avoidance.update(&mut world, DELTA_TIME)));
    });
}

fn bench_extract(c: &mut Criterion) {
    let (world, config) = populated(OBJECT_COUNT);
    let mut records: Vec<RenderRecord> = Vec::with_capacity(world.entity_count());

    c.bench_function("extract_1M", |b| {
        b.iter(|| {
            extract(&world, config.display_scale, &mut records);
            black_box(records.len())
        });
    });
}

/// Theoretical floor: integrate a bare float array with no bounds or masks.
fn bench_raw_slice_update(c: &mut Criterion) {
    let mut positions: Vec<[f32; 2]> = vec![[0.0; 2]; OBJECT_COUNT];
    let velocities: Vec<[f32; 2]> = vec![[0.5, 0.6]; OBJECT_COUNT];

    c.bench_function("raw_slice_1M_update", |b| {
        b.iter(|| {
            for (pos, vel) in positions.iter_mut().zip(velocities.iter()) {
                pos[0] += vel[0] * DELTA_TIME;
                pos[1] += vel[1] * DELTA_TIME;
            }
            black_box(positions.len())
        });
    });
}

criterion_group!(
    benches,
    bench_full_step,
    bench_movement,
    bench_avoidance,
    bench_extract,
    bench_raw_slice_update,
);

criterion_main!(benches);
