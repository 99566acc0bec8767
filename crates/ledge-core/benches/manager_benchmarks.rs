//! Manager Benchmarks
//!
//! Steady-state costs of the containers and managers a frame runs through

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::Vec2;
use ledge_core::components::{
    AnimationComponent, GravityComponent, GroundCollisionComponent, MovementComponent,
};
use ledge_core::registry::FlatFloor;
use ledge_core::{
    EngineConfig, FixedCapacityContainer, GameRoot, Phase, Phased, PhasedObjectManager,
    SortAlgorithm, SystemRegistry, Updatable,
};

struct Tick {
    phase: Phase,
    count: u32,
}

impl Phased for Tick {
    fn phase(&self) -> Phase {
        self.phase
    }
}

impl Updatable<u32> for Tick {
    fn update(&mut self, _time_delta: f32, total: &mut u32) {
        self.count += 1;
        *total += 1;
    }
}

fn scrambled(count: usize) -> Vec<i32> {
    // Deterministic shuffle
    (0..count as i32).map(|i| (i * 7919) % count as i32).collect()
}

fn bench_container_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_sort");

    for algorithm in [
        SortAlgorithm::Quick,
        SortAlgorithm::Shell,
        SortAlgorithm::Insertion,
        SortAlgorithm::Standard,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{algorithm:?}")),
            &algorithm,
            |b, &algorithm| {
                let values = scrambled(384);
                b.iter_batched(
                    || {
                        let mut container = FixedCapacityContainer::with_comparator(384, i32::cmp);
                        container.set_sort_algorithm(algorithm);
                        values.iter().for_each(|v| container.add(*v));
                        container
                    },
                    |mut container| {
                        container.sort(false);
                        container
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_phased_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("phased_commit");

    for count in [8usize, 24, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut manager = PhasedObjectManager::new(count);
                    for i in 0..count {
                        manager.add(Tick {
                            phase: Phase::ALL[(i * 5) % Phase::ALL.len()],
                            count: 0,
                        });
                    }
                    manager
                },
                |mut manager| {
                    black_box(manager.commit_updates());
                    manager
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_phased_update(c: &mut Criterion) {
    let mut manager = PhasedObjectManager::new(24);
    for i in 0..24 {
        manager.add(Tick {
            phase: Phase::ALL[i % Phase::ALL.len()],
            count: 0,
        });
    }
    manager.commit_updates();

    c.bench_function("phased_update_24", |b| {
        b.iter(|| {
            let mut total = 0u32;
            manager.update(black_box(1.0 / 60.0), &mut total);
            total
        });
    });
}

fn bench_root_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("root_frame");

    for count in [32usize, 128, 384] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let config = EngineConfig {
                max_game_objects: count,
                component_pool_size: count,
                ..EngineConfig::default()
            };
            let systems = SystemRegistry::new(&config).with_collision(FlatFloor {
                height: 0.0,
                pit: None,
            });
            let mut root = GameRoot::with_systems(config, systems);
            for i in 0..count {
                root.spawn(|object, factory| {
                    object.state.position = Vec2::new(i as f32 * 4.0, 50.0);
                    object.state.activation_radius = -1.0;
                    object.add(factory.allocate_component::<GravityComponent>());
                    object.add(factory.allocate_component::<MovementComponent>());
                    object.add(factory.allocate_component::<GroundCollisionComponent>());
                    object.add(factory.allocate_component::<AnimationComponent>());
                });
            }
            root.update(1.0 / 60.0);

            b.iter(|| root.update(black_box(1.0 / 60.0)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_container_sort,
    bench_phased_commit,
    bench_phased_update,
    bench_root_frame
);
criterion_main!(benches);
