use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use outpost_core::{SimConfig, Simulation};

fn bench_opening_ticks(c: &mut Criterion) {
    c.bench_function("opening_1000_ticks", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(SimConfig::default(), black_box(7)).unwrap();
            sim.run(1000)
        })
    });
}

fn bench_defended_step(c: &mut Criterion) {
    // Mid-game state: a ring of defenses, extra workers and a few waves in
    let mut sim = Simulation::new(SimConfig::default(), 11).unwrap();
    sim.add_minerals(10_000.0).unwrap();
    for i in 0..6 {
        let x = 1700.0 + 120.0 * i as f32;
        let _ = sim.build_turret(Vec2::new(x, 2000.0));
        let _ = sim.build_worker(None);
    }
    let _ = sim.build_battery(Vec2::new(2000.0, 2150.0));
    let _ = sim.build_missile_launcher(Vec2::new(2000.0, 1900.0));
    sim.run(8000);

    c.bench_function("defended_step", |b| {
        b.iter_batched(
            || sim.world().clone(),
            |world| {
                let mut copy = Simulation::new(SimConfig::default(), 11).unwrap();
                *copy.world_mut() = world;
                copy.step();
                black_box(copy.tick())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_opening_ticks, bench_defended_step);
criterion_main!(benches);
