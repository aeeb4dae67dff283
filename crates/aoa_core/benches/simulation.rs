//! Turn resolution benchmarks for aoa_core.
//!
//! Run with: `cargo bench -p aoa_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use aoa_core::data::{BuildingKind, UnitKind, Zone};
use aoa_core::player::PlayerId;
use aoa_core::simulation::Simulation;
use aoa_core::world::WorldState;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

fn battle_state() -> WorldState {
    let mut world = WorldState::new_game();
    for id in PlayerId::ALL {
        let player = world.player_mut(id);
        player.resources = aoa_core::economy::ResourcePool::new(5000, 5000, 5000);
        player.age = aoa_core::data::Age::Castle;
        player.add_building(player.home, BuildingKind::Barracks);
        player.add_building(player.home, BuildingKind::Range);
        player.add_building(player.home, BuildingKind::Tower);
    }
    let a = world.player_mut(PlayerId::A);
    a.add_units(Zone::MidA, UnitKind::Knight, 6);
    a.add_units(Zone::MidA, UnitKind::Archer, 10);
    let b = world.player_mut(PlayerId::B);
    b.add_units(Zone::MidA, UnitKind::Militia, 12);
    b.add_units(Zone::MidA, UnitKind::Catapult, 2);
    world
}

/// Runs turn resolution benchmarks for the aoa_core crate.
pub fn simulation_benchmark(c: &mut Criterion) {
    let sim = Simulation::default();

    c.bench_function("idle_turn", |b| {
        let state = sim.new_game();
        b.iter(|| sim.step(black_box(&state), &json!({}), &json!({})));
    });

    c.bench_function("battle_turn", |b| {
        let state = battle_state();
        let intent = json!({
            "train": [{"unit": "Knight", "count": 3}, {"unit": "Archer", "count": 5}],
            "build": [{"building": "Wall"}],
            "task_villagers": {"food": 1, "wood": 1, "gold": 1},
        });
        b.iter(|| sim.step(black_box(&state), &intent, &intent));
    });

    c.bench_function("full_idle_match", |b| {
        b.iter(|| {
            let mut state = sim.new_game();
            while !state.is_over() {
                state = sim.step(&state, &json!({}), &json!({}));
            }
            black_box(state)
        });
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
