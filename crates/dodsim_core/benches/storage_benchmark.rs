//! # Storage Layout Benchmark
//!
//! Same scene, same seed, two layouts: struct-of-arrays against one heap
//! object per entity with boxed components.
//!
//! Run with: `cargo bench --package dodsim_core --bench storage_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dodsim_core::{random, BackendKind, ComponentMask, SimConfig, World, DEFAULT_BOUNDS};

const TARGET_COUNT: usize = 20;
const DELTA_TIME: f32 = 1.0 / 60.0;

fn bench_step_by_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_by_layout");
    group.sample_size(20);

    for kind in BackendKind::ALL {
        for count in [10_000, 100_000] {
            let mut backend =
                kind.create(SimConfig::new(count, TARGET_COUNT, DEFAULT_BOUNDS, 0));
            backend.initialize().expect("initialize");

            group.bench_with_input(BenchmarkId::new(kind.as_str(), count), &count, |b, _| {
                b.iter(|| black_box(backend.step(0.0, DELTA_TIME).expect("step").len()));
            });
        }
    }

    group.finish();
}

fn bench_initialize_by_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("initialize_by_layout");
    group.sample_size(10);

    for kind in BackendKind::ALL {
        group.bench_function(BenchmarkId::new(kind.as_str(), 100_000), |b| {
            b.iter(|| {
                let mut backend =
                    kind.create(SimConfig::new(100_000, TARGET_COUNT, DEFAULT_BOUNDS, 0));
                backend.initialize().expect("initialize");
                black_box(backend.entity_count())
            });
        });
    }

    group.finish();
}

/// Component access patterns on the struct-of-arrays store.
fn bench_component_access(c: &mut Criterion) {
    let count = 1_000_000;
    let mut world = World::with_capacity(count);
    let mut rng = random::seeded(0);
    for i in 0..count {
        let entity = world.create_entity("object").expect("create");
        world
            .attach_position(entity, i as f32, random::unit(&mut rng))
            .expect("position");
    }

    let mut group = c.benchmark_group("component_access");

    group.bench_function("sequential_read_1M", |b| {
        b.iter(|| {
            let mut sum = 0.0_f32;
            for pos in world.positions() {
                sum += pos.x;
            }
            black_box(sum)
        });
    });

    group.bench_function("masked_count_1M", |b| {
        b.iter(|| black_box(world.count_with(ComponentMask::POSITION)));
    });

    let indices: Vec<usize> = (0..10_000)
        .map(|_| random::index(&mut rng, count as u32) as usize)
        .collect();

    group.bench_function("random_access_10K", |b| {
        b.iter(|| {
            let mut sum = 0.0_f32;
            for &idx in &indices {
                if let Some(pos) = world.positions().get(idx) {
                    sum += pos.y;
                }
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_step_by_layout,
    bench_initialize_by_layout,
    bench_component_access,
);

criterion_main!(benches);
